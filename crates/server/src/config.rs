/// Listener and CORS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: String::from("0.0.0.0:8000"),
            origins: vec![
                String::from("http://localhost:3000"),
                String::from("http://localhost:3001"),
            ],
        }
    }
}

impl Config {
    /// Reads `BIND_ADDR` and the comma-separated `CORS_ORIGINS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: std::env::var("BIND_ADDR")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.bind),
            origins: std::env::var("CORS_ORIGINS")
                .ok()
                .map(|s| Self::origins(&s))
                .filter(|o| !o.is_empty())
                .unwrap_or(defaults.origins),
        }
    }
    pub fn origins(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_lists() {
        assert_eq!(
            Config::origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(Config::origins(" , ").is_empty());
        assert_eq!(Config::default().bind, "0.0.0.0:8000");
    }
}
