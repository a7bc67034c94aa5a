use std::hash::Hash;

use log::error;
use rustc_hash::FxHashMap;
use tokio_postgres::types::ToSql;

use crate::db::models::{PriceObservation, ProductionRecord, WellInventoryRecord};
use crate::db::postgres::PostgresClient;

/// Sanitize a string for PostgreSQL by removing null bytes (0x00)
/// which are invalid in UTF-8 text columns
fn sanitize_string(s: &str) -> String {
    s.replace('\0', "")
}

fn sanitize_opt(s: &Option<String>) -> Option<String> {
    s.as_deref().map(sanitize_string)
}

/// Build `($1, ..., $n), ($n+1, ...)` placeholder groups for a multi-row insert.
fn values_placeholders(rows: usize, cols_per_row: usize) -> String {
    (0..rows)
        .map(|i| {
            let start = i * cols_per_row + 1;
            let placeholders: Vec<String> = (start..start + cols_per_row)
                .map(|n| format!("${}", n))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keep the last row for each key, in first-seen order. A multi-row
/// `ON CONFLICT DO UPDATE` cannot touch the same key twice.
fn last_per_key<T, K, F>(rows: &[T], key: F) -> Vec<&T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut positions: FxHashMap<K, usize> = FxHashMap::default();
    let mut kept: Vec<&T> = Vec::with_capacity(rows.len());
    for row in rows {
        match positions.get(&key(row)) {
            Some(&i) => kept[i] = row,
            None => {
                positions.insert(key(row), kept.len());
                kept.push(row);
            },
        }
    }
    kept
}

impl PostgresClient {
    // ==================== PRODUCTION ====================

    /// Batch insert production rows (multi-row VALUES).
    ///
    /// Rows already present for the same (well, month) are left untouched,
    /// so re-running an interrupted load only adds what is missing.
    /// Returns the number of rows actually inserted.
    pub async fn insert_production(&self, records: &[ProductionRecord]) -> anyhow::Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        const COLS_PER_ROW: usize = 14;
        const BATCH_SIZE: usize = 2000; // 14 * 2000 stays under the 65535 bind parameter cap

        let client = self.pool.get().await?;
        let mut inserted = 0;

        for chunk in records.chunks(BATCH_SIZE) {
            let query = format!(
                r#"
                INSERT INTO produccion (
                    idpozo, anio, mes, empresa, sigla,
                    prod_pet, prod_gas, prod_agua, gas_venteo,
                    formacion, cuenca, provincia, tipo_de_recurso, fecha_data
                ) VALUES {}
                ON CONFLICT (idpozo, fecha_data) DO NOTHING
                "#,
                values_placeholders(chunk.len(), COLS_PER_ROW)
            );

            // Store sanitized strings
            let sanitized: Vec<[Option<String>; 6]> = chunk
                .iter()
                .map(|r| {
                    [
                        Some(sanitize_string(&r.operator)),
                        sanitize_opt(&r.acronym),
                        sanitize_opt(&r.formation),
                        sanitize_opt(&r.basin),
                        sanitize_opt(&r.province),
                        sanitize_opt(&r.resource_type),
                    ]
                })
                .collect();

            let mut params: Vec<&(dyn ToSql + Sync)> =
                Vec::with_capacity(chunk.len() * COLS_PER_ROW);
            for (i, record) in chunk.iter().enumerate() {
                let text = &sanitized[i];
                params.push(&record.well_id);
                params.push(&record.year);
                params.push(&record.month);
                params.push(&text[0]);
                params.push(&text[1]);
                params.push(&record.oil_volume);
                params.push(&record.gas_volume);
                params.push(&record.water_volume);
                params.push(&record.gas_flared);
                params.push(&text[2]);
                params.push(&text[3]);
                params.push(&text[4]);
                params.push(&text[5]);
                params.push(&record.date);
            }

            inserted += client.execute(&query, &params).await.map_err(|e| {
                error!("Failed to batch insert {} production rows: {:?}", chunk.len(), e);
                e
            })?;
        }

        Ok(inserted)
    }

    // ==================== PRICES ====================

    /// Insert or replace monthly reference prices.
    pub async fn upsert_prices(&self, prices: &[PriceObservation]) -> anyhow::Result<u64> {
        if prices.is_empty() {
            return Ok(0);
        }

        const COLS_PER_ROW: usize = 3;
        const BATCH_SIZE: usize = 5000;

        let prices = last_per_key(prices, |p| (p.year, p.month));

        let client = self.pool.get().await?;
        let mut written = 0;

        for chunk in prices.chunks(BATCH_SIZE) {
            let query = format!(
                r#"
                INSERT INTO precios_brent (anio, mes, precio_usd)
                VALUES {}
                ON CONFLICT (anio, mes) DO UPDATE SET
                    precio_usd = EXCLUDED.precio_usd
                "#,
                values_placeholders(chunk.len(), COLS_PER_ROW)
            );

            let mut params: Vec<&(dyn ToSql + Sync)> =
                Vec::with_capacity(chunk.len() * COLS_PER_ROW);
            for price in chunk {
                params.push(&price.year);
                params.push(&price.month);
                params.push(&price.price_usd_per_bbl);
            }

            written += client.execute(&query, &params).await.map_err(|e| {
                error!("Failed to upsert {} prices: {:?}", chunk.len(), e);
                e
            })?;
        }

        Ok(written)
    }

    // ==================== WELL INVENTORY ====================

    /// Insert or update drilling inventory rows keyed by well id.
    pub async fn upsert_wells(&self, wells: &[WellInventoryRecord]) -> anyhow::Result<u64> {
        if wells.is_empty() {
            return Ok(0);
        }

        const COLS_PER_ROW: usize = 4;
        const BATCH_SIZE: usize = 5000;

        let wells = last_per_key(wells, |w| w.well_id);

        let client = self.pool.get().await?;
        let mut written = 0;

        for chunk in wells.chunks(BATCH_SIZE) {
            let query = format!(
                r#"
                INSERT INTO inventario_pozos (
                    idpozo, empresa, fecha_fin_perforacion, fecha_inicio_produccion
                ) VALUES {}
                ON CONFLICT (idpozo) DO UPDATE SET
                    empresa = EXCLUDED.empresa,
                    fecha_fin_perforacion = EXCLUDED.fecha_fin_perforacion,
                    fecha_inicio_produccion = EXCLUDED.fecha_inicio_produccion
                "#,
                values_placeholders(chunk.len(), COLS_PER_ROW)
            );

            let operators: Vec<String> = chunk.iter().map(|w| sanitize_string(&w.operator)).collect();

            let mut params: Vec<&(dyn ToSql + Sync)> =
                Vec::with_capacity(chunk.len() * COLS_PER_ROW);
            for (i, well) in chunk.iter().enumerate() {
                params.push(&well.well_id);
                params.push(&operators[i]);
                params.push(&well.drilling_completed_on);
                params.push(&well.production_started_on);
            }

            written += client.execute(&query, &params).await.map_err(|e| {
                error!("Failed to upsert {} wells: {:?}", chunk.len(), e);
                e
            })?;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_placeholders_numbering() {
        assert_eq!(values_placeholders(2, 3), "($1, $2, $3), ($4, $5, $6)");
        assert_eq!(values_placeholders(0, 3), "");
    }

    #[test]
    fn test_last_per_key_keeps_latest_row() {
        let prices = vec![
            PriceObservation::new(2024, 1, 70.0),
            PriceObservation::new(2024, 2, 72.0),
            PriceObservation::new(2024, 1, 71.5),
        ];
        let kept = last_per_key(&prices, |p| (p.year, p.month));

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].price_usd_per_bbl, 71.5);
        assert_eq!(kept[1].month, 2);
    }

    #[test]
    fn test_sanitize_strips_nul_bytes() {
        assert_eq!(sanitize_string("Y\0PF"), "YPF");
        assert_eq!(sanitize_opt(&Some("A\0".to_string())), Some("A".to_string()));
        assert_eq!(sanitize_opt(&None), None);
    }
}
