use tracing::debug;

use super::{CredentialStore, Organization, StoreResult};

pub async fn create_organization(
    store: &dyn CredentialStore,
    name: &str,
) -> StoreResult<Organization> {
    let slug = name_to_slug(name);
    debug!(%name, %slug, "creating organization");
    store.insert_organization(name, &slug).await
}

/// Spaces become hyphens and a fixed set of punctuation is dropped; anything
/// left that is unsafe in a URL is percent-encoded.
pub fn name_to_slug(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '\'' | '"' | '!' | '@' | '#' | '$' | '%' | '^' | '&' | '*' | '(' | ')' => None,
            c => Some(c),
        })
        .collect::<String>()
        .to_lowercase();
    urlencoding::encode(&replaced).into_owned()
}

/// Name given to the organization of a user who registers on their own.
pub fn family_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}'s Family")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn slugs_are_derived_from_names() {
        let table = [
            ("My Org", "my-org"),
            ("Michael Helvey's Family", "michael-helveys-family"),
            ("my!#very%20stupid ^ thing", "myvery20stupid--thing"),
        ];
        for (name, expected) in table {
            assert_eq!(name_to_slug(name), expected, "slug for {name:?}");
            assert_eq!(name_to_slug(name), name_to_slug(name));
        }
    }

    #[test]
    fn residual_unsafe_characters_are_percent_encoded() {
        assert_eq!(name_to_slug("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(name_to_slug("Café"), "caf%C3%A9");
    }

    #[test]
    fn family_name_format() {
        assert_eq!(family_name("Rumpel", "Stiltskin"), "Rumpel Stiltskin's Family");
    }

    #[tokio::test]
    async fn create_organization_stores_name_and_slug() {
        let store = MemoryStore::new();
        let org = create_organization(&store, "My Org").await.unwrap();
        assert_eq!(org.name, "My Org");
        assert_eq!(org.slug, "my-org");
        let stored = store.get_organization_by_id(org.id).await.unwrap();
        assert_eq!(stored, Some(org));
    }
}
