use async_trait::async_trait;

use crate::db::models::{
    FlaringTotals, MonthlyFluids, MonthlyProduction, OperatorKpis, OperatorRevenue,
    UncompletedWells, WellMonth,
};
use crate::db::postgres::PostgresClient;
use crate::db::{ProductionFilter, ProductionStore};

#[async_trait]
impl ProductionStore for PostgresClient {
    async fn operators(&self) -> anyhow::Result<Vec<String>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT DISTINCT empresa FROM produccion ORDER BY empresa ASC",
                &[],
            )
            .await?;

        Ok(rows.iter().map(|row| row.get("empresa")).collect())
    }

    async fn monthly_production(
        &self,
        operator: &str,
        filter: &ProductionFilter,
    ) -> anyhow::Result<Vec<MonthlyProduction>> {
        let client = self.pool.get().await?;
        // Months without a reference price sum to NULL revenue.
        let query = r#"
            SELECT
                p.fecha_data,
                SUM(p.prod_pet) AS petroleo,
                SUM(p.prod_gas) AS gas,
                SUM(p.prod_pet * pr.precio_usd) AS revenue_usd
            FROM produccion p
            LEFT JOIN precios_brent pr ON p.anio = pr.anio AND p.mes = pr.mes
            WHERE p.empresa = $1
              AND ($2::date IS NULL OR p.fecha_data >= $2::date)
              AND (cardinality($3::text[]) = 0 OR p.formacion ILIKE ANY($3::text[]))
            GROUP BY p.fecha_data
            ORDER BY p.fecha_data ASC
        "#;

        let patterns = filter.formation_patterns();
        let rows = client
            .query(query, &[&operator, &filter.since, &patterns])
            .await?;
        let months = rows
            .iter()
            .map(|row| MonthlyProduction {
                date: row.get("fecha_data"),
                oil: row.get("petroleo"),
                gas: row.get("gas"),
                revenue_usd: row.get("revenue_usd"),
            })
            .collect();

        Ok(months)
    }

    async fn monthly_fluids(
        &self,
        operator: &str,
        filter: &ProductionFilter,
    ) -> anyhow::Result<Vec<MonthlyFluids>> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT
                fecha_data,
                SUM(prod_agua) AS agua,
                SUM(prod_gas) AS gas,
                SUM(prod_pet) AS petroleo
            FROM produccion
            WHERE empresa = $1
              AND ($2::date IS NULL OR fecha_data >= $2::date)
              AND (cardinality($3::text[]) = 0 OR formacion ILIKE ANY($3::text[]))
            GROUP BY fecha_data
            ORDER BY fecha_data ASC
        "#;

        let patterns = filter.formation_patterns();
        let rows = client
            .query(query, &[&operator, &filter.since, &patterns])
            .await?;
        let months = rows
            .iter()
            .map(|row| MonthlyFluids {
                date: row.get("fecha_data"),
                water: row.get("agua"),
                gas: row.get("gas"),
                oil: row.get("petroleo"),
            })
            .collect();

        Ok(months)
    }

    async fn well_months(&self, operator: &str) -> anyhow::Result<Vec<WellMonth>> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT idpozo, fecha_data, SUM(prod_pet) AS petroleo
            FROM produccion
            WHERE empresa = $1
            GROUP BY idpozo, fecha_data
            ORDER BY idpozo ASC, fecha_data ASC
        "#;

        let rows = client.query(query, &[&operator]).await?;
        let wells = rows
            .iter()
            .map(|row| WellMonth {
                well_id: row.get("idpozo"),
                date: row.get("fecha_data"),
                oil: row.get("petroleo"),
            })
            .collect();

        Ok(wells)
    }

    async fn uncompleted_wells(&self) -> anyhow::Result<Vec<UncompletedWells>> {
        let client = self.pool.get().await?;
        // Production start is either recorded in the inventory or derived
        // from the presence of production rows.
        let query = r#"
            SELECT i.empresa, COUNT(*) AS pozos
            FROM inventario_pozos i
            WHERE i.fecha_fin_perforacion IS NOT NULL
              AND i.fecha_inicio_produccion IS NULL
              AND NOT EXISTS (SELECT 1 FROM produccion p WHERE p.idpozo = i.idpozo)
            GROUP BY i.empresa
            ORDER BY pozos DESC, i.empresa ASC
        "#;

        let rows = client.query(query, &[]).await?;
        let counts = rows
            .iter()
            .map(|row| UncompletedWells {
                operator: row.get("empresa"),
                count: row.get("pozos"),
            })
            .collect();

        Ok(counts)
    }

    async fn flaring_totals(&self) -> anyhow::Result<Vec<FlaringTotals>> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT empresa, SUM(prod_gas) AS gas, SUM(gas_venteo) AS venteo
            FROM produccion
            GROUP BY empresa
            ORDER BY empresa ASC
        "#;

        let rows = client.query(query, &[]).await?;
        let totals = rows
            .iter()
            .map(|row| FlaringTotals {
                operator: row.get("empresa"),
                gas: row.get("gas"),
                flared: row.get("venteo"),
            })
            .collect();

        Ok(totals)
    }

    async fn operator_kpis(
        &self,
        operators: &[String],
        filter: &ProductionFilter,
    ) -> anyhow::Result<OperatorKpis> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT
                COALESCE(SUM(p.prod_pet), 0) AS petroleo,
                COALESCE(SUM(p.prod_gas), 0) AS gas,
                COUNT(*) AS registros,
                COALESCE(SUM(p.prod_pet * pr.precio_usd), 0) AS revenue_usd
            FROM produccion p
            LEFT JOIN precios_brent pr ON p.anio = pr.anio AND p.mes = pr.mes
            WHERE (cardinality($1::text[]) = 0 OR p.empresa = ANY($1::text[]))
              AND ($2::date IS NULL OR p.fecha_data >= $2::date)
              AND (cardinality($3::text[]) = 0 OR p.formacion ILIKE ANY($3::text[]))
        "#;

        let patterns = filter.formation_patterns();
        let row = client
            .query_one(query, &[&operators, &filter.since, &patterns])
            .await?;

        Ok(OperatorKpis {
            oil: row.get("petroleo"),
            gas: row.get("gas"),
            records: row.get("registros"),
            revenue_usd: row.get("revenue_usd"),
        })
    }

    async fn revenue_ranking(
        &self,
        limit: i64,
        filter: &ProductionFilter,
    ) -> anyhow::Result<Vec<OperatorRevenue>> {
        let client = self.pool.get().await?;
        let query = r#"
            SELECT p.empresa, COALESCE(SUM(p.prod_pet * pr.precio_usd), 0) AS revenue_usd
            FROM produccion p
            LEFT JOIN precios_brent pr ON p.anio = pr.anio AND p.mes = pr.mes
            WHERE ($2::date IS NULL OR p.fecha_data >= $2::date)
              AND (cardinality($3::text[]) = 0 OR p.formacion ILIKE ANY($3::text[]))
            GROUP BY p.empresa
            ORDER BY revenue_usd DESC, p.empresa ASC
            LIMIT $1
        "#;

        let patterns = filter.formation_patterns();
        let rows = client
            .query(query, &[&limit, &filter.since, &patterns])
            .await?;
        let ranking = rows
            .iter()
            .map(|row| OperatorRevenue {
                operator: row.get("empresa"),
                revenue_usd: row.get("revenue_usd"),
            })
            .collect();

        Ok(ranking)
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        self.ping().await
    }
}
