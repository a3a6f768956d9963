use crate::config::Config;
use crate::error::ApiError;
use crate::meal::{Meal, MealsResponse};
use reqwest::blocking::Client;

/// Read access to the recipe API.
///
/// Workers hold this behind an `Arc` so tests can substitute an in-memory catalog.
pub trait MealApi: Send + Sync {
    /// `search.php?s=`; an empty list means nothing matched
    fn search(&self, term: &str) -> Result<Vec<Meal>, ApiError>;

    /// `lookup.php?i=`
    fn lookup(&self, id: &str) -> Result<Option<Meal>, ApiError>;
}

pub struct MealDbClient {
    http: Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("mealdb/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, term: &str) -> String {
        format!(
            "{}/search.php?s={}",
            self.base_url,
            urlencoding::encode(term)
        )
    }

    pub fn lookup_url(&self, id: &str) -> String {
        format!("{}/lookup.php?i={}", self.base_url, urlencoding::encode(id))
    }

    fn get_meals(&self, url: &str) -> Result<Vec<Meal>, ApiError> {
        log::debug!("GET {}", url);
        let response = self.http.get(url).send()?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let body = response.text()?;
        let parsed: MealsResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_meals())
    }
}

impl MealApi for MealDbClient {
    fn search(&self, term: &str) -> Result<Vec<Meal>, ApiError> {
        self.get_meals(&self.search_url(term))
    }

    fn lookup(&self, id: &str) -> Result<Option<Meal>, ApiError> {
        Ok(self.get_meals(&self.lookup_url(id))?.into_iter().next())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::meal::tests::arrabiata;

    /// In-memory catalog holding the Arrabiata fixture; matches on "arr"
    pub(crate) struct FixtureApi;

    impl MealApi for FixtureApi {
        fn search(&self, term: &str) -> Result<Vec<Meal>, ApiError> {
            if term.to_lowercase().contains("arr") {
                Ok(vec![arrabiata()])
            } else {
                Ok(Vec::new())
            }
        }

        fn lookup(&self, id: &str) -> Result<Option<Meal>, ApiError> {
            Ok(Some(arrabiata()).filter(|m| m.id == id))
        }
    }

    fn client(base: &str) -> MealDbClient {
        let config = Config {
            api_url: base.to_string(),
            ..Config::default()
        };
        MealDbClient::new(&config).unwrap()
    }

    #[test]
    fn test_search_url_encodes_term() {
        let c = client("https://www.themealdb.com/api/json/v1/1");
        assert_eq!(
            c.search_url("mac & cheese"),
            "https://www.themealdb.com/api/json/v1/1/search.php?s=mac%20%26%20cheese"
        );
    }

    #[test]
    fn test_lookup_url_trims_trailing_slash() {
        let c = client("http://localhost:9000/api/");
        assert_eq!(c.lookup_url("52771"), "http://localhost:9000/api/lookup.php?i=52771");
    }
}
