// src/mock.rs
//! Locally generated placeholder batches for the no-credential and
//! upstream-failure paths. Shapes match a real batch; roughly half the items
//! carry a source URL so the UI exercises both renderings.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::types::NormalizedTrend;

const MOCK_BATCH_SIZE: usize = 10;

const MOCK_TITLES: &[&str] = &[
    "Dólar blue sube a $1350 tras nuevas restricciones",
    "BCRA sube tasa de política monetaria al 118%",
    "YPF anuncia inversión de US$5000M en Vaca Muerta",
    "Bitcoin alcanza máximo histórico en pesos argentinos",
    "Inflación de noviembre podría superar el 4%",
    "Merval opera con fuerte volatilidad por elecciones en EEUU",
    "Soja rompe los US$400 en Chicago por sequía en Brasil",
    "FMI aprueba nuevo desembolso de US$800M para Argentina",
    "Galicia y Macro lideran ganancias en el panel líder",
    "Bonos soberanos suben 3% tras anuncio del Ministro",
    "Construcción cae 15% interanual según INDEC",
    "Tesla evalúa instalación de planta de litio en Catamarca",
];

const MOCK_SUMMARIES: &[&str] = &[
    "El tipo de cambio paralelo registra nueva suba ante mayor demanda de cobertura. Operadores esperan más presión.",
    "La autoridad monetaria endurece su política ante presiones inflacionarias. Analistas debaten efectividad.",
    "La petrolera estatal confirma megainversión en shale oil. Esperan duplicar producción en 3 años.",
    "La criptomoneda marca récord en moneda local por devaluación. Inversores buscan refugio.",
    "Consultoras privadas proyectan aceleración de precios. Alimentos lideran aumentos.",
    "El índice bursátil local muestra alta sensibilidad a factores externos. Inversores cautelosos.",
    "El commodity agrícola se dispara por problemas climáticos. Argentina podría beneficiarse.",
    "El organismo internacional libera fondos del programa. Cumplimiento de metas bajo la lupa.",
    "Los bancos privados muestran mejor performance bursátil. ADRs también en alza.",
    "Los títulos públicos reaccionan positivamente a declaraciones oficiales. Riesgo país baja.",
    "El sector muestra contracción por menor obra pública. Empresarios piden medidas.",
    "La automotriz analiza oportunidades en el triángulo del litio. Podría generar 5000 empleos.",
];

const MOCK_TAGS: &[&str] = &[
    "dolar",
    "economia",
    "finanzas",
    "mercados",
    "inflacion",
    "bcra",
    "inversiones",
    "cripto",
    "commodities",
    "bonos",
    "acciones",
    "argentina",
];

/// Build a placeholder batch stamped at `now`. Ids carry a `mock-` prefix so
/// recycled fixtures are recognizable in the UI and in logs.
pub fn mock_trends(now: DateTime<Utc>) -> Vec<NormalizedTrend> {
    let mut rng = rand::rng();
    let millis = now.timestamp_millis();
    let stamp = now.to_rfc3339();

    let titles: Vec<&&str> = MOCK_TITLES.choose_multiple(&mut rng, MOCK_BATCH_SIZE).collect();
    let summaries: Vec<&&str> = MOCK_SUMMARIES
        .choose_multiple(&mut rng, MOCK_BATCH_SIZE)
        .collect();

    titles
        .into_iter()
        .zip(summaries)
        .enumerate()
        .map(|(idx, (title, summary))| {
            let tags = MOCK_TAGS
                .choose_multiple(&mut rng, 4)
                .map(|t| t.to_string())
                .collect();
            let source_url = if rng.random_bool(0.5) {
                Some(format!("https://twitter.com/mock/status/{millis}{idx}"))
            } else {
                None
            };
            NormalizedTrend {
                id: format!("mock-{millis}-{idx}"),
                title: title.to_string(),
                summary: summary.to_string(),
                score: rng.random_range(50..90),
                tags,
                source_url,
                timestamp: stamp.clone(),
            }
        })
        .collect()
}
