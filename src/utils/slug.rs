/// Slug URL-safe dérivé d'un nom de catégorie: minuscules, accents latins
/// courants repliés en ASCII (é → e, œ → oe, ...), les suites de caractères
/// restants non alphanumériques deviennent un seul tiret. Les caractères
/// hors de la table de repli sont abandonnés, pas translittérés.
/// Déterministe: même nom → même slug. Calculé une seule fois à la création
/// (un renommage ne recalcule pas le slug).
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut previous_dash = true; // évite un tiret en tête

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            previous_dash = false;
        } else if let Some(folded) = fold_accent(c) {
            slug.push_str(folded);
            previous_dash = false;
        } else if !previous_dash {
            slug.push('-');
            previous_dash = true;
        }
    }

    // pas de tiret en queue
    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Repli ASCII des lettres accentuées latines courantes (entrée déjà en
/// minuscules). None pour tout le reste.
fn fold_accent(c: char) -> Option<&'static str> {
    Some(match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ç' => "c",
        'ñ' => "n",
        'œ' => "oe",
        'æ' => "ae",
        'ß' => "ss",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basique() {
        assert_eq!(slugify("Electronics"), "electronics");
        assert_eq!(slugify("Home & Garden"), "home-garden");
    }

    #[test]
    fn test_slugify_replie_les_accents() {
        assert_eq!(slugify("  Été 2024  "), "ete-2024");
        assert_eq!(slugify("Café crème"), "cafe-creme");
        assert_eq!(slugify("Œufs & Fromages"), "oeufs-fromages");
    }

    #[test]
    fn test_slugify_deterministe() {
        assert_eq!(slugify("Home & Garden"), slugify("Home & Garden"));
    }
}
