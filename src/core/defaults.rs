//! RC-002: Built-in recipe set used whenever no usable persisted file exists.

use super::types::Recipe;

/// The built-in table. Never empty.
pub fn default_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new(
            "Pankūkas",
            "Milti, Piens, Olas, Cukurs",
            "Samaisa sastāvdaļas un cep uz pannas.",
        ),
        Recipe::new(
            "Karbonāde",
            "Cūkgaļa, Ola, Rīvmaize, Garšvielas",
            "Gaļu panē un cep uz pannas.",
        ),
        Recipe::new(
            "Zupa",
            "Burkāni, Kartupeļi, Gaļa, Sīpoli",
            "Sastāvdaļas vāra kopā līdz gatavs.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rc002_defaults_not_empty() {
        let d = default_recipes();
        assert_eq!(d.len(), 3);
        assert_eq!(d[0].name, "Pankūkas");
        assert!(d.iter().all(|r| r.ingredient_names().count() == 4));
    }
}
