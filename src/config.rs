// src/config.rs
//! Search vocabulary: rotating X account bundles, focus topics and time
//! modifiers the collector samples from on every fresh fetch.
//!
//! Loaded from `config/trends.toml` (path overridable via env); any missing
//! table falls back to the compiled-in defaults below, so the service and the
//! test suite run without a config file on disk.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_TRENDS_CONFIG_PATH: &str = "config/trends.toml";
pub const ENV_TRENDS_CONFIG_PATH: &str = "TRENDS_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Rotating sets of X handles; two bundles are flattened per fresh fetch.
    #[serde(default = "default_account_bundles")]
    pub account_bundles: Vec<Vec<String>>,
    /// Topic seeds; three are sampled into each search prompt.
    #[serde(default = "default_focus_topics")]
    pub focus_topics: Vec<String>,
    /// Recency phrasings; one is sampled into each search prompt.
    #[serde(default = "default_time_modifiers")]
    pub time_modifiers: Vec<String>,
    /// ISO country code for the news source filter.
    #[serde(default = "default_country")]
    pub country: String,
    /// Upstream Live Search result cap.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            account_bundles: default_account_bundles(),
            focus_topics: default_focus_topics(),
            time_modifiers: default_time_modifiers(),
            country: default_country(),
            max_search_results: default_max_search_results(),
        }
    }
}

impl SearchConfig {
    /// Read the TOML config from `TRENDS_CONFIG_PATH` (or the default path).
    /// Missing or unparsable files fall back to the compiled-in defaults.
    pub fn load() -> Self {
        let path = std::env::var(ENV_TRENDS_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TRENDS_CONFIG_PATH));
        match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "trends config unparsable, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

fn default_country() -> String {
    "AR".to_string()
}

fn default_max_search_results() -> u32 {
    10
}

fn to_strings(rows: &[&str]) -> Vec<String> {
    rows.iter().map(|s| s.to_string()).collect()
}

fn default_account_bundles() -> Vec<Vec<String>> {
    vec![
        to_strings(&[
            "UVA",
            "BCRAOFICIAL",
            "Economia_Ar",
            "AmbitoFinanciero",
            "IEconTerm",
            "elEconomista_es",
        ]),
        to_strings(&["infobae", "Clarin", "lanacion", "cronista", "pagina12", "tn"]),
        to_strings(&[
            "MinEconomia_Ar",
            "INDECArgentina",
            "BancoNacion",
            "BancoCentral_AR",
            "afip",
        ]),
        to_strings(&[
            "dolarhoy",
            "DolarBlue",
            "DolarHoyNet",
            "CotizacionDolar",
            "DolarAlDia",
        ]),
        to_strings(&[
            "BullMarketBrok",
            "InvertirOnline",
            "BalanzBroker",
            "ConosSur",
            "PuenteNet",
        ]),
        to_strings(&[
            "byma_oficial",
            "ROFEX_oficial",
            "MAE_oficial",
            "bolsadecereales",
            "bolsacom",
        ]),
    ]
}

fn default_focus_topics() -> Vec<String> {
    to_strings(&[
        "dólar blue MEP CCL crypto",
        "inflación IPC precios canasta básica",
        "tasas BCRA plazo fijo Leliq",
        "acciones Merval ADR Wall Street",
        "soja trigo maíz exportaciones retenciones",
        "YPF Pampa Energía Galicia Macro",
        "bitcoin ethereum USDT cripto Argentina",
        "FMI deuda reservas BCRA",
        "Milei Caputo medidas económicas",
        "CEPO restricciones importaciones",
        "bonos soberanos AL30 GD30",
        "construcción inmobiliario créditos UVA",
    ])
}

fn default_time_modifiers() -> Vec<String> {
    to_strings(&[
        "en las últimas 2 horas",
        "hoy",
        "en este momento",
        "trending ahora",
        "breaking news",
        "últimas noticias",
        "lo más comentado",
        "viral en X",
    ])
}
