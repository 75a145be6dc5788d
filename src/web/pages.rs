//! RC-043: Server-rendered HTML pages.

use super::clean::encode_segment;
use crate::core::markup::escape;
use crate::core::types::Recipe;
use std::fmt::Write as _;

/// Facts shown on the about page.
pub const FACTS: [&str; 3] = [
    "Vai zināji? Senajā Romā tomāti tika uzskatīti par indīgiem!",
    "Latviešu virtuve ir slavena ar rupjmaizi, pelēkajiem zirņiem un speķi.",
    "Pirmā pavārgrāmata tika publicēta 1746. gadā.",
];

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="lv">
<head>
<meta charset="utf-8">
<title>{title} · Receptes</title>
</head>
<body>
<nav><a href="/">Sākums</a> | <a href="/recipes">Receptes</a> | <a href="/search">Meklēt</a> | <a href="/about">Par mums</a></nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Link to a recipe's detail page.
pub fn recipe_href(name: &str) -> String {
    format!("/recipe/{}", encode_segment(name))
}

fn recipe_items(recipes: &[Recipe]) -> String {
    let mut out = String::from("<ul class=\"recipes\">\n");
    for r in recipes {
        let _ = writeln!(
            out,
            r#"<li><a href="{}">{}</a> <small>{}</small></li>"#,
            escape(&recipe_href(&r.name)),
            escape(&r.name),
            escape(&r.ingredients)
        );
    }
    out.push_str("</ul>\n");
    out
}

fn ingredient_items(recipe: &Recipe) -> String {
    let mut out = String::from("<ul class=\"ingredients\">\n");
    for name in recipe.ingredient_names() {
        let _ = writeln!(out, "<li>{}</li>", escape(name));
    }
    out.push_str("</ul>\n");
    out
}

pub fn home(featured: Option<&Recipe>, recipes: &[Recipe]) -> String {
    let mut body = String::from("<h1>Receptes</h1>\n");
    match featured {
        Some(r) => {
            let _ = writeln!(
                body,
                r#"<section class="featured"><h2>Dienas recepte: <a href="{}">{}</a></h2>{}<p>{}</p></section>"#,
                escape(&recipe_href(&r.name)),
                escape(&r.name),
                ingredient_items(r),
                escape(&r.preparation)
            );
        }
        None => body.push_str("<p>Recepšu vēl nav.</p>\n"),
    }
    let _ = writeln!(body, "<p>Kopā receptes: {}</p>", recipes.len());
    body.push_str(&recipe_items(recipes));
    body.push_str(r#"<img src="/chart" alt="Populārākās sastāvdaļas">"#);
    body.push('\n');
    layout("Sākums", &body)
}

pub fn recipe_list(recipes: &[Recipe]) -> String {
    let body = format!("<h1>Visas receptes</h1>\n{}", recipe_items(recipes));
    layout("Receptes", &body)
}

pub fn recipe_detail(recipe: &Recipe) -> String {
    let body = format!(
        "<h1>{}</h1>\n<h2>Sastāvdaļas</h2>\n{}<h2>Pagatavošana</h2>\n<p>{}</p>\n",
        escape(&recipe.name),
        ingredient_items(recipe),
        escape(&recipe.preparation)
    );
    layout(&recipe.name, &body)
}

pub fn about(facts: &[&str]) -> String {
    let mut body = String::from("<h1>Par mums</h1>\n<ul class=\"facts\">\n");
    for fact in facts {
        let _ = writeln!(body, "<li>{}</li>", escape(fact));
    }
    body.push_str("</ul>\n");
    layout("Par mums", &body)
}

/// Search page. `query` is `None` when no query parameter was given.
pub fn search(query: Option<&str>, results: &[Recipe]) -> String {
    let value = query.map(escape).unwrap_or_default();
    let mut body = format!(
        "<h1>Meklēt</h1>\n<form action=\"/search\" method=\"get\"><input name=\"q\" value=\"{value}\"><button>Meklēt</button></form>\n"
    );
    if let Some(q) = query {
        let _ = writeln!(
            body,
            "<p>Rezultāti vaicājumam \u{201c}{}\u{201d}: {}</p>",
            escape(q),
            results.len()
        );
    }
    if results.is_empty() {
        body.push_str("<p>Nekas netika atrasts.</p>\n");
    } else {
        body.push_str(&recipe_items(results));
    }
    layout("Meklēt", &body)
}

pub fn not_found() -> String {
    layout(
        "404",
        "<h1>404</h1>\n<p>Lapa netika atrasta.</p>\n",
    )
}

pub fn server_error() -> String {
    layout(
        "500",
        "<h1>500</h1>\n<p>Servera kļūda. Mēģiniet vēlreiz vēlāk.</p>\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pancakes() -> Recipe {
        Recipe::new("Pankūkas", "Milti, Piens", "Samaisa & cep.")
    }

    #[test]
    fn test_rc043_home_featured() {
        let r = pancakes();
        let html = home(Some(&r), std::slice::from_ref(&r));
        assert!(html.contains("Dienas recepte"));
        assert!(html.contains("Kopā receptes: 1"));
        assert!(html.contains("Samaisa &amp; cep."));
        assert!(html.contains("/recipe/Pank%C5%ABkas"));
    }

    #[test]
    fn test_rc043_home_without_featured() {
        let html = home(None, &[]);
        assert!(html.contains("Recepšu vēl nav."));
        assert!(html.contains("Kopā receptes: 0"));
    }

    #[test]
    fn test_rc043_detail_lists_ingredients() {
        let html = recipe_detail(&pancakes());
        assert!(html.contains("<li>Milti</li>"));
        assert!(html.contains("<li>Piens</li>"));
        assert!(html.contains("<title>Pankūkas · Receptes</title>"));
    }

    #[test]
    fn test_rc043_escapes_names() {
        let r = Recipe::new("<b>X</b>", "a", "b");
        let html = recipe_list(&[r]);
        assert!(html.contains("&lt;b&gt;X&lt;/b&gt;"));
        assert!(!html.contains("<b>X</b>"));
    }

    #[test]
    fn test_rc043_search_states() {
        let none = search(None, &[]);
        assert!(!none.contains("Rezultāti"));

        let empty = search(Some(""), &[]);
        assert!(empty.contains("Rezultāti"));
        assert!(empty.contains("Nekas netika atrasts."));

        let hit = search(Some("milti"), &[pancakes()]);
        assert!(hit.contains("value=\"milti\""));
        assert!(hit.contains(": 1</p>"));
    }

    #[test]
    fn test_rc043_about_facts() {
        let html = about(&FACTS);
        assert_eq!(html.matches("<li>").count(), 3);
    }
}
