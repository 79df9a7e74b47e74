// src/article.rs
//! Draft-generation request: payload schema, whole-payload validation, and
//! the editorial prompt sent to the writer model.

use serde::Deserialize;

use crate::normalize::is_http_url;

fn default_score() -> i32 {
    50
}

/// A trend as selected by the editor. Only `id` and `title` are required;
/// the rest defaults like the UI's own schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedTrend {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_score")]
    pub score: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleRequest {
    pub trends: Vec<SelectedTrend>,
}

impl ArticleRequest {
    /// The payload is accepted or rejected as a whole; the first violation
    /// wins and no upstream call is made on rejection.
    pub fn validate(&self) -> Result<(), String> {
        if self.trends.is_empty() {
            return Err("trends must contain at least one item".to_string());
        }
        for (idx, t) in self.trends.iter().enumerate() {
            if t.id.trim().is_empty() {
                return Err(format!("trends[{idx}].id must be a non-empty string"));
            }
            if t.title.trim().is_empty() {
                return Err(format!("trends[{idx}].title must be a non-empty string"));
            }
            if let Some(url) = &t.source_url {
                if !is_http_url(url) {
                    return Err(format!("trends[{idx}].sourceUrl must be an http(s) URL"));
                }
            }
        }
        Ok(())
    }
}

/// System directive plus user instruction for the writer model.
#[derive(Debug, Clone)]
pub struct DraftPrompt {
    pub system: String,
    pub user: String,
}

/// One line per selected trend: title, hashtags, source reference.
fn topics_block(trends: &[SelectedTrend]) -> String {
    trends
        .iter()
        .map(|t| {
            let mut line = format!("- {}", t.title);
            if !t.tags.is_empty() {
                let tags: Vec<String> = t.tags.iter().map(|x| format!("#{x}")).collect();
                line.push_str(&format!(" ({})", tags.join(" ")));
            }
            if let Some(url) = &t.source_url {
                line.push_str(&format!(" [fuente: {url}]"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed style directive: professional financial register, 900-1000 words,
/// title/copete/subheaded body/closing template.
pub fn build_draft_prompt(trends: &[SelectedTrend]) -> DraftPrompt {
    let system = "Eres un redactor senior de un diario económico argentino. Escribe con rigor \
económico, claridad y neutralidad, evitando hype. Prioriza datos, contexto local y comparaciones \
con series históricas. Tono profesional, conciso, didáctico."
        .to_string();

    let user = format!(
        "Genera un artículo periodístico listo para editar (900-1000 palabras) sobre uno o varios \
de los siguientes tópicos seleccionados por el editor. Incluye título atractivo pero sobrio, \
copete de 2-3 líneas, cuerpo con subtítulos, y un cierre con próximos pasos o riesgos a \
monitorear. Mantén enfoque en economía/finanzas y audiencia de 20-60. Evita inventar cifras.\n\
\n\
Cuando existan fuentes o señales, PRIORIZA incluir datos concretos: números, porcentajes, fechas, \
rangos, variaciones intermensuales/interanuales, montos en ARS/USD, y referencias comparativas \
(p. ej., vs. promedio 5 años). Cita brevemente entre corchetes [fuente: ...] si se mencionó una \
URL o medio. Si faltan datos, sugiere explícitamente dónde obtenerlos (BCRA, INDEC, Hacienda, \
mercados, etc.).\n\
\n\
Tópicos:\n{topics}\n\n\
Estructura:\n\
1) Título\n\
2) Copete\n\
3) Desarrollo con subtítulos (H2/H3)\n\
4) Cierre con escenarios y próximos pasos.\n\
Si hay URL de fuente, incorpórala como referencia entre corchetes al final.",
        topics = topics_block(trends),
    );

    DraftPrompt { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(title: &str, url: Option<&str>) -> SelectedTrend {
        SelectedTrend {
            id: "1".into(),
            title: title.into(),
            summary: String::new(),
            score: 50,
            tags: vec!["dolar".into(), "bcra".into()],
            source_url: url.map(str::to_string),
        }
    }

    #[test]
    fn empty_selection_is_rejected() {
        let req = ArticleRequest { trends: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_required_fields_reject_the_whole_payload() {
        let mut bad = selected("Dólar blue en alza", None);
        bad.id = "  ".into();
        let req = ArticleRequest {
            trends: vec![selected("ok", None), bad],
        };
        let err = req.validate().unwrap_err();
        assert!(err.contains("trends[1].id"), "got: {err}");
    }

    #[test]
    fn non_http_source_url_is_rejected() {
        let req = ArticleRequest {
            trends: vec![selected("Dólar", Some("ftp://bad.example"))],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let req: ArticleRequest =
            serde_json::from_str(r#"{"trends":[{"id":"a","title":"Dólar"}]}"#).expect("parse");
        assert!(req.validate().is_ok());
        let t = &req.trends[0];
        assert_eq!(t.score, 50);
        assert!(t.summary.is_empty());
        assert!(t.tags.is_empty());
        assert!(t.source_url.is_none());
    }

    #[test]
    fn prompt_embeds_titles_tags_and_sources() {
        let prompt = build_draft_prompt(&[selected(
            "Dólar blue en alza",
            Some("https://ambito.com/nota"),
        )]);
        assert!(prompt.user.contains("- Dólar blue en alza (#dolar #bcra) [fuente: https://ambito.com/nota]"));
        assert!(prompt.user.contains("900-1000 palabras"));
        assert!(prompt.system.contains("redactor senior"));
    }
}
