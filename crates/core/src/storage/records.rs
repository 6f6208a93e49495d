use crate::domain::quote::StoredRecord;
use anyhow::Context;
use chrono::NaiveDate;
use sqlx::SqlitePool;

type RecordRow = (
    NaiveDate,
    String,
    String,
    f64,
    i64,
    Option<f64>,
    String,
    String,
    String,
);

pub async fn create_table(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS stocks ( \
           id INTEGER PRIMARY KEY AUTOINCREMENT, \
           date TEXT NOT NULL, \
           symbol TEXT NOT NULL, \
           name TEXT NOT NULL, \
           price REAL NOT NULL, \
           volume INTEGER NOT NULL, \
           score REAL, \
           sentiment TEXT NOT NULL, \
           recommendation TEXT NOT NULL, \
           policy TEXT NOT NULL \
         )",
    )
    .execute(pool)
    .await
    .context("create stocks table failed")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS stocks_date_policy_idx ON stocks (date, policy)")
        .execute(pool)
        .await
        .context("create stocks index failed")?;

    Ok(())
}

/// Appends one run's rows in a single transaction.
pub async fn append(pool: &SqlitePool, records: &[StoredRecord]) -> anyhow::Result<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let mut inserted: u64 = 0;
    for record in records {
        let volume = i64::try_from(record.volume)
            .with_context(|| format!("volume out of range for {}", record.symbol))?;

        let res = sqlx::query(
            "INSERT INTO stocks (date, symbol, name, price, volume, score, sentiment, recommendation, policy) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.date)
        .bind(&record.symbol)
        .bind(&record.name)
        .bind(record.price)
        .bind(volume)
        .bind(record.score)
        .bind(record.sentiment.as_str())
        .bind(record.recommendation.to_string())
        .bind(&record.policy)
        .execute(&mut *tx)
        .await
        .context("insert stocks failed")?;

        inserted += res.rows_affected();
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(inserted)
}

pub async fn list_by_date(
    pool: &SqlitePool,
    date: NaiveDate,
    policy: Option<&str>,
) -> anyhow::Result<Vec<StoredRecord>> {
    let rows = sqlx::query_as::<_, RecordRow>(
        "SELECT date, symbol, name, price, volume, score, sentiment, recommendation, policy \
         FROM stocks \
         WHERE date = ? AND (? IS NULL OR policy = ?) \
         ORDER BY id ASC",
    )
    .bind(date)
    .bind(policy)
    .bind(policy)
    .fetch_all(pool)
    .await
    .context("select stocks failed")?;

    rows.into_iter().map(record_from_row).collect()
}

pub async fn latest_date(
    pool: &SqlitePool,
    policy: Option<&str>,
) -> anyhow::Result<Option<NaiveDate>> {
    let row = sqlx::query_as::<_, (NaiveDate,)>(
        "SELECT date FROM stocks \
         WHERE (? IS NULL OR policy = ?) \
         ORDER BY date DESC, id DESC \
         LIMIT 1",
    )
    .bind(policy)
    .bind(policy)
    .fetch_optional(pool)
    .await
    .context("select latest stocks date failed")?;

    Ok(row.map(|(date,)| date))
}

fn record_from_row(row: RecordRow) -> anyhow::Result<StoredRecord> {
    let (date, symbol, name, price, volume, score, sentiment, recommendation, policy) = row;
    let volume = u64::try_from(volume)
        .with_context(|| format!("negative volume in DB for {date} {symbol}"))?;

    Ok(StoredRecord {
        date,
        name,
        price,
        volume,
        score,
        sentiment: sentiment
            .parse()
            .with_context(|| format!("invalid sentiment in DB for {date} {symbol}"))?,
        recommendation: recommendation
            .parse()
            .with_context(|| format!("invalid recommendation in DB for {date} {symbol}"))?,
        policy,
        symbol,
    })
}
