//! Configuration file.
//!
//! A TOML file with four sections:
//!
//! ```toml
//! [credentials]
//! incoming_username = "me@example.com"
//! incoming_password = "..."
//! outgoing_username = "me@example.com"
//! outgoing_password = "..."
//! display_name = "Support"
//! display_mail = "support@example.com"
//!
//! [server]
//! imap_host = "imap.example.com"
//! smtp_host = "smtp.example.com"
//! inbox_folder = "INBOX"
//! trash_folder = "Trash"
//!
//! [content]
//! request_from = ""
//! reply_subject = "Re: [SUBJECT]"
//! reply_body = "Thanks, we got your message."
//!
//! [general]
//! debug = false
//! ```
//!
//! A `responseBody.html` next to the file replaces `reply_body` and turns
//! on HTML replies.
//!
//! The older INI layout (`autoresponder.config.ini` with sections such as
//! `[login credentials]` and dotted keys like `mailserver.incoming.username`,
//! and `debug = yes`/`on`) is not read. Such files fail with a parse error
//! and have to be converted to the TOML layout above.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::mail::ReplyTemplate;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "autoresponder.config.toml";

/// HTML body override, looked up in the configuration file's directory.
pub const HTML_BODY_FILE: &str = "responseBody.html";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub server: ServerConfig,
    pub content: ContentConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Login data. Passwords are redacted in `Debug` output.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    pub incoming_username: String,
    pub incoming_password: SecretString,
    pub outgoing_username: String,
    pub outgoing_password: SecretString,
    /// Display name on outgoing replies.
    pub display_name: String,
    /// Sender address on outgoing replies.
    pub display_mail: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub imap_host: String,
    /// Implicit TLS port.
    #[serde(default = "default_imap_port")]
    pub imap_port: u16,
    pub smtp_host: String,
    /// STARTTLS submission port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub inbox_folder: String,
    pub trash_folder: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Sender filter; empty or `*` answers everyone.
    pub request_from: String,
    pub reply_subject: String,
    #[serde(default)]
    pub reply_body: String,
    /// Set when the body came from the HTML override file.
    #[serde(skip)]
    pub reply_body_is_html: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub debug: bool,
}

fn default_imap_port() -> u16 {
    993
}

fn default_smtp_port() -> u16 {
    587
}

impl Config {
    /// Read and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&raw)?;

        let html_path = html_body_path(path);
        if html_path.is_file() {
            config.content.reply_body = std::fs::read_to_string(&html_path)?;
            config.content.reply_body_is_html = true;
        }
        Ok(config)
    }

    /// Parse configuration text. Subject and body are trimmed.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.content.reply_subject = config.content.reply_subject.trim().to_string();
        config.content.reply_body = config.content.reply_body.trim().to_string();
        Ok(config)
    }

    /// The reply template for this run.
    pub fn reply_template(&self) -> ReplyTemplate {
        ReplyTemplate {
            subject: self.content.reply_subject.clone(),
            body: self.content.reply_body.clone(),
            is_html: self.content.reply_body_is_html,
        }
    }
}

/// Where the HTML body override for the configuration at `config_path` lives.
pub fn html_body_path(config_path: &Path) -> PathBuf {
    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(HTML_BODY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[credentials]
incoming_username = "in@example.com"
incoming_password = "in-secret"
outgoing_username = "out@example.com"
outgoing_password = "out-secret"
display_name = "Support"
display_mail = "support@example.com"

[server]
imap_host = "imap.example.com"
smtp_host = "smtp.example.com"
inbox_folder = "INBOX"
trash_folder = "Trash"

[content]
request_from = "a@x"
reply_subject = "  Re: [SUBJECT]  "
reply_body = """
  Thanks for your message.
"""
"#;

    #[test]
    fn parses_sample_with_defaults() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.server.imap_port, 993);
        assert_eq!(config.server.smtp_port, 587);
        assert_eq!(config.content.request_from, "a@x");
        assert_eq!(config.content.reply_subject, "Re: [SUBJECT]");
        assert_eq!(config.content.reply_body, "Thanks for your message.");
        assert!(!config.content.reply_body_is_html);
        assert!(!config.general.debug);
    }

    #[test]
    fn legacy_ini_layout_is_rejected() {
        let raw = "[login credentials]\n\
                   mailserver.incoming.username = me@example.com\n\
                   [general]\n\
                   debug = yes\n";
        assert!(matches!(
            Config::from_toml(raw),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn reply_body_is_optional() {
        let raw = SAMPLE.replace("reply_body = \"\"\"\n  Thanks for your message.\n\"\"\"\n", "");
        let config = Config::from_toml(&raw).unwrap();
        assert_eq!(config.content.reply_body, "");
    }

    #[test]
    fn debug_flag() {
        let raw = format!("{SAMPLE}\n[general]\ndebug = true\n");
        assert!(Config::from_toml(&raw).unwrap().general.debug);
    }

    #[test]
    fn missing_key_is_parse_error() {
        let raw = SAMPLE.replace("trash_folder = \"Trash\"\n", "");
        let err = Config::from_toml(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(ref m) if m.contains("trash_folder")));
    }

    #[test]
    fn debug_output_redacts_passwords() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("in-secret"));
        assert!(!printed.contains("out-secret"));
        assert!(printed.contains("in@example.com"));
    }

    #[test]
    fn load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/autoresponder.config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn load_without_html_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoresponder.config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        let template = config.reply_template();
        assert_eq!(template.body, "Thanks for your message.");
        assert!(!template.is_html);
    }

    #[test]
    fn load_with_html_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoresponder.config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        std::fs::write(dir.path().join(HTML_BODY_FILE), "<p>[BODY]</p>\n").unwrap();

        let config = Config::load(&path).unwrap();
        let template = config.reply_template();
        assert_eq!(template.body, "<p>[BODY]</p>\n");
        assert!(template.is_html);
    }

    #[test]
    fn html_path_for_bare_file_name() {
        assert_eq!(
            html_body_path(Path::new("autoresponder.config.toml")),
            Path::new("./responseBody.html")
        );
    }
}
