use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the TTS backend, e.g. "http://tts_container:8003/"
    pub tts_server_url: String,
    pub download_dir: PathBuf,
    pub output_path: PathBuf,
    pub max_split_depth: u32,
    pub environment: Environment,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            tts_server_url: env::var("TTS_SERVER_URL")?,
            download_dir: env::var("DOWNLOAD_DIR")
                .unwrap_or_else(|_| "downloads".to_string())
                .into(),
            output_path: env::var("OUTPUT_PATH")
                .unwrap_or_else(|_| "output.wav".to_string())
                .into(),
            max_split_depth: env::var("MAX_SPLIT_DEPTH")
                .unwrap_or_else(|_| "16".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Predict endpoint of the TTS backend.
    pub fn tts_predict_url(&self) -> String {
        format!("{}tts/run/predict", self.base_url())
    }

    /// Prefix for retrieving rendered files; the remote ref is appended verbatim.
    pub fn file_url_prefix(&self) -> String {
        format!("{}tts/file=", self.base_url())
    }

    fn base_url(&self) -> String {
        if self.tts_server_url.ends_with('/') {
            self.tts_server_url.clone()
        } else {
            format!("{}/", self.tts_server_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_with_url(url: &str) -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            tts_server_url: url.to_string(),
            download_dir: "downloads".into(),
            output_path: "output.wav".into(),
            max_split_depth: 16,
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
        }
    }

    #[test]
    fn derives_backend_urls_from_base() {
        let config = config_with_url("http://tts_container:8003/");
        assert_eq!(
            config.tts_predict_url(),
            "http://tts_container:8003/tts/run/predict"
        );
        assert_eq!(
            config.file_url_prefix(),
            "http://tts_container:8003/tts/file="
        );
    }

    #[test]
    fn tolerates_missing_trailing_slash() {
        let config = config_with_url("http://localhost:8003");
        assert_eq!(
            config.tts_predict_url(),
            "http://localhost:8003/tts/run/predict"
        );
    }
}
