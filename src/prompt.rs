use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::{
    config::{DEFAULT_DECIMALS, DEFAULT_INITIAL_SUPPLY},
    error::ConfigError,
};

const MAX_DECIMALS: u8 = 9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

fn default_initial_supply() -> u64 {
    DEFAULT_INITIAL_SUPPLY
}

impl TokenSpec {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut spec: TokenSpec = serde_json::from_str(&text)
            .map_err(|e| ConfigError::InvalidTokenConfig(e.to_string()))?;
        spec.normalize();
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidTokenConfig("name is required".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::InvalidTokenConfig("symbol is required".into()));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::InvalidTokenConfig(format!(
                "decimals must be between 0 and {MAX_DECIMALS}"
            )));
        }
        if self.initial_supply == 0 {
            return Err(ConfigError::InvalidTokenConfig(
                "initial supply must be a positive number".into(),
            ));
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.symbol = self.symbol.trim().to_string();
        let blank_to_none = |v: &mut Option<String>| {
            if v.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *v = None;
            }
        };
        blank_to_none(&mut self.description);
        blank_to_none(&mut self.image_url);
    }

    pub fn print_summary(&self) {
        println!("{}", "\n📝 Token details:".bold().white());
        println!("• Name: {}", self.name.cyan());
        println!("• Symbol: {}", self.symbol.cyan());
        println!("• Decimals: {}", self.decimals.to_string().cyan());
        println!("• Initial Supply: {}", self.initial_supply.to_string().cyan());
        if let Some(url) = &self.image_url {
            println!("• Image URL: {}", url.cyan());
        }
        if let Some(path) = &self.image_path {
            println!("• Image Path: {}", path.display().to_string().cyan());
        }
        if let Some(desc) = &self.description {
            println!("• Description: {}", desc.cyan());
        }
        println!();
    }
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    // None at end of input.
    fn ask(&mut self, label: &str, default: Option<&str>) -> io::Result<Option<String>> {
        match default {
            Some(d) => write!(self.output, "{} {} ", label.bold(), format!("({d})").dimmed())?,
            None => write!(self.output, "{} ", label.bold())?,
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        if answer.is_empty() {
            Ok(Some(default.unwrap_or_default().to_string()))
        } else {
            Ok(Some(answer.to_string()))
        }
    }

    fn ask_until<T>(
        &mut self,
        label: &str,
        default: Option<&str>,
        check: impl Fn(&str) -> Result<T, String>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(answer) = self.ask(label, default)? else {
                return Ok(None);
            };
            match check(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(why) => writeln!(self.output, "{}", why.red())?,
            }
        }
    }

    pub fn collect_token_spec(&mut self) -> Result<Option<TokenSpec>> {
        let Some(name) = self.ask("Token name:", None)? else {
            return Ok(None);
        };
        if name.is_empty() {
            return Ok(None);
        }

        let Some(symbol) = self.ask_until("Token symbol:", None, |s| {
            if s.is_empty() {
                Err("Symbol is required".into())
            } else {
                Ok(s.to_string())
            }
        })?
        else {
            return Ok(None);
        };

        let default_decimals = DEFAULT_DECIMALS.to_string();
        let Some(decimals) = self.ask_until("Token decimals:", Some(&default_decimals), |s| {
            s.parse::<u8>()
                .ok()
                .filter(|d| *d <= MAX_DECIMALS)
                .ok_or_else(|| format!("Decimals must be between 0 and {MAX_DECIMALS}"))
        })?
        else {
            return Ok(None);
        };

        let default_supply = DEFAULT_INITIAL_SUPPLY.to_string();
        let Some(initial_supply) = self.ask_until("Initial supply:", Some(&default_supply), |s| {
            s.replace('_', "")
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| "Initial supply must be a positive whole number".to_string())
        })?
        else {
            return Ok(None);
        };

        let description = self.ask("Token description (optional):", None)?;
        let image_url = self.ask("Token image URL (optional):", None)?;

        let mut spec = TokenSpec {
            name,
            symbol,
            decimals,
            initial_supply,
            description,
            image_url,
            image_path: None,
        };
        spec.normalize();
        Ok(Some(spec))
    }

    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        let Some(answer) = self.ask(&format!("{question} [{hint}]"), None)? else {
            return Ok(false);
        };
        Ok(match answer.to_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn collects_with_defaults() {
        let mut p = prompter("Gold Coin\nGOLD\n\n\n\n\n");
        let spec = p.collect_token_spec().unwrap().unwrap();
        assert_eq!(spec.name, "Gold Coin");
        assert_eq!(spec.symbol, "GOLD");
        assert_eq!(spec.decimals, DEFAULT_DECIMALS);
        assert_eq!(spec.initial_supply, DEFAULT_INITIAL_SUPPLY);
        assert_eq!(spec.description, None);
        assert_eq!(spec.image_url, None);
    }

    #[test]
    fn reasks_on_invalid_answers() {
        let mut p = prompter("Gold\n\nGLD\n12\n6\n0\nabc\n5000\nShiny\nhttps://x/y.png\n");
        let spec = p.collect_token_spec().unwrap().unwrap();
        assert_eq!(spec.symbol, "GLD");
        assert_eq!(spec.decimals, 6);
        assert_eq!(spec.initial_supply, 5000);
        assert_eq!(spec.description.as_deref(), Some("Shiny"));
        assert_eq!(spec.image_url.as_deref(), Some("https://x/y.png"));

        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("Symbol is required"));
        assert!(shown.contains("Decimals must be between 0 and 9"));
        assert!(shown.contains("positive whole number"));
    }

    #[test]
    fn empty_name_cancels() {
        assert!(prompter("\n").collect_token_spec().unwrap().is_none());
        assert!(prompter("").collect_token_spec().unwrap().is_none());
        assert!(prompter("Gold\n").collect_token_spec().unwrap().is_none());
    }

    #[test]
    fn confirm_defaults_and_answers() {
        assert!(prompter("\n").confirm("Proceed?", true).unwrap());
        assert!(!prompter("\n").confirm("Proceed?", false).unwrap());
        assert!(prompter("yes\n").confirm("Proceed?", false).unwrap());
        assert!(!prompter("n\n").confirm("Proceed?", true).unwrap());
        assert!(!prompter("").confirm("Proceed?", true).unwrap());
    }

    #[test]
    fn loads_config_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(
            &path,
            r#"{"name":" Gold ","symbol":"GLD","description":"","imagePath":"logo.png"}"#,
        )
        .unwrap();

        let spec = TokenSpec::from_file(&path).unwrap();
        assert_eq!(spec.name, "Gold");
        assert_eq!(spec.decimals, DEFAULT_DECIMALS);
        assert_eq!(spec.initial_supply, DEFAULT_INITIAL_SUPPLY);
        assert_eq!(spec.description, None);
        assert_eq!(spec.image_path, Some(PathBuf::from("logo.png")));
    }

    #[test]
    fn rejects_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        fs::write(&path, r#"{"name":"Gold","symbol":"GLD","decimals":12}"#).unwrap();
        assert!(TokenSpec::from_file(&path).is_err());

        fs::write(&path, r#"{"name":"","symbol":"GLD"}"#).unwrap();
        assert!(TokenSpec::from_file(&path).is_err());

        fs::write(&path, "not json").unwrap();
        assert!(TokenSpec::from_file(&path).is_err());

        assert!(TokenSpec::from_file(&dir.path().join("missing.json")).is_err());
    }
}
