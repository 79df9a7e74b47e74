// src/prompt.rs
//! Dynamic search prompt for the trend collector.
//!
//! Every fresh fetch samples a different slice of the vocabulary (bundles,
//! topics, recency phrasing) and frames the search for the current market
//! moment, so consecutive fetches do not converge on the same candidates.

use rand::seq::{IndexedRandom, SliceRandom};

use crate::config::SearchConfig;

/// Upper bound of candidates requested from the model per fresh fetch.
pub const MAX_FRESH_TRENDS: usize = 18;

/// xAI caps Live Search at 10 handles per request.
pub const MAX_ACCOUNT_HANDLES: usize = 10;

/// Accounts echoed back to the UI.
pub const ECHO_ACCOUNTS: usize = 6;

/// A fully assembled search: the prompt text plus the handles it targets.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub accounts: Vec<String>,
    pub prompt: String,
}

/// Frame the search for the time of day (server-local hour, 0..=23).
/// Market hours win over the opening/closing windows they overlap.
pub fn contextual_focus(hour: u32) -> &'static str {
    if (11..=17).contains(&hour) {
        "Prioriza movimientos del mercado en tiempo real, cotizaciones, y reacciones inmediatas."
    } else if (6..11).contains(&hour) {
        "Enfócate en apertura de mercados, expectativas del día, y noticias overnight."
    } else if (17..22).contains(&hour) {
        "Resalta cierre de mercados, análisis del día, y proyecciones para mañana."
    } else {
        "Busca noticias internacionales, mercados globales, y anticipos para Argentina."
    }
}

/// Sample `count` elements of `pool` in random order (fewer if the pool is small).
fn sample<T: Clone>(pool: &[T], count: usize) -> Vec<T> {
    let mut rng = rand::rng();
    pool.choose_multiple(&mut rng, count).cloned().collect()
}

/// Build the prompt and account selection for one fresh fetch.
pub fn build_search_plan(cfg: &SearchConfig, hour: u32) -> SearchPlan {
    let mut accounts: Vec<String> = sample(&cfg.account_bundles, 2).concat();
    accounts.shuffle(&mut rand::rng());
    accounts.truncate(MAX_ACCOUNT_HANDLES);

    let time_modifier = sample(&cfg.time_modifiers, 1)
        .into_iter()
        .next()
        .unwrap_or_else(|| "hoy".to_string());
    let focus_topics = sample(&cfg.focus_topics, 3).join(", ");

    let prompt = format!(
        "Eres un asistente para un editor de un diario económico argentino.\n\
Busca señales de tendencia {time_modifier} relevantes para lectores de 20 a 60 años interesados en economía y finanzas argentinas.\n\
\n\
{contextual}\n\
\n\
Temas prioritarios para esta búsqueda: {focus_topics}\n\
\n\
IMPORTANTE:\n\
- Busca información NUEVA y FRESCA, no repitas tendencias anteriores\n\
- Prioriza lo que está sucediendo AHORA MISMO\n\
- Incluye rumores de mercado, tweets virales, y reacciones en tiempo real\n\
- Mezcla noticias confirmadas con especulaciones y análisis\n\
- Varía entre temas macro, micro, empresas, commodities y cripto\n\
\n\
Devuelve hasta {max_trends} tendencias ÚNICAS y ACTUALES. Cada ítem debe tener (OBLIGATORIO):\n\
- title: máx 90 chars, debe ser llamativo y actual\n\
- summary: 1-2 frases con información específica y números cuando sea posible\n\
- score: 0-100 según qué tan \"caliente\" está el tema ahora\n\
- tags: 3-6 hashtags relevantes\n\
- sourceIndex: índice (1-based) que referencia UNA de las citas devueltas por Live Search (citas = arreglo de fuentes que acompaña tu respuesta). Debes elegir la mejor fuente que sustenta ese ítem. Solo 1 índice por tendencia.\n\
- (opcional) sourceUrl: si dispones de la URL exacta de la cita elegida, puedes incluirla, pero DEBE coincidir con una de las citas.\n\
\n\
Reglas de formato y calidad:\n\
- No repitas información genérica. Cada tendencia debe ser específica del momento actual.\n\
- Cada objeto debe incluir un campo sourceIndex (número entero >=1). Evita textos como \"N/A\".\n\
- Formatea la salida estrictamente como JSON válido bajo la clave \"trends\" (array).",
        time_modifier = time_modifier,
        contextual = contextual_focus(hour),
        focus_topics = focus_topics,
        max_trends = MAX_FRESH_TRENDS,
    );

    SearchPlan { accounts, prompt }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_hours_take_precedence_over_closing_window() {
        // 17h sits in both ranges; the realtime framing must win.
        assert!(contextual_focus(17).contains("tiempo real"));
        assert!(contextual_focus(18).contains("cierre"));
    }

    #[test]
    fn framing_covers_the_whole_day() {
        assert!(contextual_focus(8).contains("apertura"));
        assert!(contextual_focus(13).contains("tiempo real"));
        assert!(contextual_focus(21).contains("cierre"));
        assert!(contextual_focus(3).contains("internacionales"));
        assert!(contextual_focus(23).contains("internacionales"));
    }

    #[test]
    fn plan_respects_handle_cap_and_mentions_sampled_topics() {
        let cfg = SearchConfig::default();
        let plan = build_search_plan(&cfg, 12);
        assert!(plan.accounts.len() <= MAX_ACCOUNT_HANDLES);
        assert!(!plan.accounts.is_empty());
        assert!(plan.prompt.contains("sourceIndex"));
        assert!(plan.prompt.contains("\"trends\""));
        // At least one configured topic should have been sampled in.
        assert!(cfg.focus_topics.iter().any(|t| plan.prompt.contains(t.as_str())));
    }
}
