use parkir_base::Sample;
use sqlx::{Connection, FromRow, PgConnection};
use tokio::runtime;
use tracing::debug;

use super::SourceError;

const REPORT_QUERY: &str = r#"
    SELECT EXTRACT(HOUR FROM waktu)::INT4 AS jam,
           EXTRACT(DOW FROM waktu)::INT4 AS hari,
           kepadatan
    FROM laporan_parkir
"#;

#[derive(Debug, FromRow)]
struct Report {
    jam: i32,
    hari: i32,
    kepadatan: String,
}

/// Runs the report query against the database at `url`, blocking until it completes.
pub fn fetch(url: &str) -> Result<Vec<Sample>, SourceError> {
    let runtime = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SourceError::Runtime)?;
    runtime.block_on(fetch_reports(url))
}

async fn fetch_reports(url: &str) -> Result<Vec<Sample>, SourceError> {
    let mut conn = PgConnection::connect(url).await?;
    let reports = sqlx::query_as::<_, Report>(REPORT_QUERY)
        .fetch_all(&mut conn)
        .await?;
    conn.close().await?;
    debug!(rows = reports.len(), "report query finished");

    reports
        .into_iter()
        .enumerate()
        .map(|(idx, report)| {
            Sample::from_raw(report.jam.into(), report.hari.into(), &report.kepadatan).map_err(
                |source| SourceError::Row {
                    row: idx + 1,
                    source,
                },
            )
        })
        .collect()
}
