use std::collections::{HashMap, HashSet};

/// # create slug
/// create a url safe slug from a name. the name is lower-cased and every run
/// of characters outside `a-z0-9` becomes a single hyphen.
///
/// ## Arguments
/// * `name` - the name to convert, for example `Sportzilla Formula Karting`
///
/// ## Returns
/// * `String` - the slug, for example `sportzilla-formula-karting`
pub fn create_slug(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

/// a driver slug as it is already stored, with what identifies its owner
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSlug {
    pub slug: String,
    pub name: String,
    pub profile_url: String,
}

/// hands out driver slugs for a single sync run.
///
/// a driver is identified by their profile url, or by their lower-cased name
/// when the url is missing. the first identity to claim a slug keeps it,
/// later identities with the same name get `-2`, `-3`, ...
/// slugs that are already stored stay with the identity that owns them.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    by_identity: HashMap<String, String>,
    taken: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> SlugRegistry {
        SlugRegistry::default()
    }

    /// # registry of the stored slugs
    /// start from the slugs that are already stored, so an identity keeps its
    /// slug between runs no matter the order it shows up in.
    ///
    /// ## Arguments
    /// * `stored` - the stored slugs, the first slug of an identity wins
    pub fn seeded(stored: &[StoredSlug]) -> SlugRegistry {
        let mut registry = SlugRegistry::new();
        for entry in stored {
            registry.taken.insert(entry.slug.clone());
            registry
                .by_identity
                .entry(SlugRegistry::identity(&entry.name, &entry.profile_url))
                .or_insert_with(|| entry.slug.clone());
        }
        registry
    }

    /// returns `None` when the name does not contain a single slug character
    pub fn assign(&mut self, name: &str, profile_url: &str) -> Option<String> {
        let base = create_slug(name);
        if base.is_empty() {
            return None;
        }

        let identity = SlugRegistry::identity(name, profile_url);
        if let Some(slug) = self.by_identity.get(&identity) {
            return Some(slug.clone());
        }

        let mut slug = base.clone();
        let mut suffix = 1;
        while self.taken.contains(&slug) {
            suffix += 1;
            slug = format!("{}-{}", base, suffix);
        }

        self.taken.insert(slug.clone());
        self.by_identity.insert(identity, slug.clone());
        Some(slug)
    }

    fn identity(name: &str, profile_url: &str) -> String {
        let url = profile_url.trim();
        if url.is_empty() {
            format!("name:{}", name.trim().to_lowercase())
        } else {
            format!("url:{}", url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_names() {
        assert_eq!(create_slug("Ammar Hassan"), "ammar-hassan");
        assert_eq!(create_slug("Sportzilla Formula Karting"), "sportzilla-formula-karting");
        assert_eq!(create_slug("Apex Autodrome"), "apex-autodrome");
        assert_eq!(create_slug("O'Brien  Jr."), "o-brien-jr");
    }

    #[test]
    fn strips_and_collapses_hyphens() {
        let slug = create_slug("  Foo--Bar!!");
        assert_eq!(slug, "foo-bar");
        assert!(!slug.starts_with('-'));
        assert!(!slug.ends_with('-'));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn slug_of_symbols_is_empty() {
        assert_eq!(create_slug("!!!"), "");
        assert_eq!(create_slug(""), "");
    }

    #[test]
    fn registry_keeps_identity_stable() {
        let mut registry = SlugRegistry::new();
        let url = "https://www.racefacer.com/en/profile/ammar";
        assert_eq!(registry.assign("Ammar Hassan", url).unwrap(), "ammar-hassan");
        assert_eq!(registry.assign("Ammar Hassan", url).unwrap(), "ammar-hassan");
    }

    #[test]
    fn registry_disambiguates_distinct_people() {
        let mut registry = SlugRegistry::new();
        let first = registry.assign("Ali Khan", "https://racefacer.com/p/1").unwrap();
        let second = registry.assign("Ali Khan", "https://racefacer.com/p/2").unwrap();
        let third = registry.assign("ALI KHAN", "").unwrap();
        let third_again = registry.assign("ali khan", "").unwrap();

        assert_eq!(first, "ali-khan");
        assert_eq!(second, "ali-khan-2");
        assert_eq!(third, "ali-khan-3");
        assert_eq!(third_again, third);
    }

    #[test]
    fn registry_skips_suffixes_already_taken() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.assign("Ali Khan 2", "").unwrap(), "ali-khan-2");
        assert_eq!(registry.assign("Ali Khan", "a").unwrap(), "ali-khan");
        assert_eq!(registry.assign("Ali Khan", "b").unwrap(), "ali-khan-3");
    }

    #[test]
    fn seeded_registry_keeps_stored_owners() {
        let stored = vec![
            StoredSlug {
                slug: "ali-khan".to_string(),
                name: "Ali Khan".to_string(),
                profile_url: "https://racefacer.com/p/1".to_string(),
            },
            StoredSlug {
                slug: "ali-khan-2".to_string(),
                name: "Ali Khan".to_string(),
                profile_url: "https://racefacer.com/p/2".to_string(),
            },
        ];
        let mut registry = SlugRegistry::seeded(&stored);

        // second owner shows up first this time
        assert_eq!(registry.assign("Ali Khan", "https://racefacer.com/p/2").unwrap(), "ali-khan-2");
        assert_eq!(registry.assign("Ali Khan", "https://racefacer.com/p/1").unwrap(), "ali-khan");
        assert_eq!(registry.assign("Ali Khan", "https://racefacer.com/p/3").unwrap(), "ali-khan-3");
    }

    #[test]
    fn registry_rejects_empty_slug() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.assign("???", "https://racefacer.com/p/9"), None);
    }
}
