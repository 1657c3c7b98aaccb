use async_trait::async_trait;
use nde_core::storage::{merge_upsert, prepare_for_save};
use nde_core::{
    Article, ArticleFilter, ArticleQuery, ArticleStorage, Error, LabelCount, Logger, Result, SaveStatus, SortField,
    StorageConfig,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Executor, Postgres, QueryBuilder};
use std::time::Duration;

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        article_id TEXT PRIMARY KEY,
        document JSONB NOT NULL,
        source TEXT NOT NULL,
        topics TEXT[] NOT NULL DEFAULT '{}',
        scraped_at TIMESTAMPTZ NOT NULL,
        published TEXT NOT NULL DEFAULT '',
        title TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS articles_topics_idx ON articles USING GIN (topics)",
    "CREATE INDEX IF NOT EXISTS articles_source_idx ON articles (source)",
    "CREATE INDEX IF NOT EXISTS articles_scraped_at_idx ON articles (scraped_at DESC)",
    // Add future migrations here
];

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Database(format!("{}: {}", context, e))
}

/// Networked document store: the full article as JSONB plus the projected columns that
/// filters, sorting and aggregation run on.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
    logger: Logger,
}

impl PostgresStorage {
    pub async fn connect_url(url: &str, timeout: Duration, logger: Logger) -> Result<Self> {
        Self::connect_in_schema(url, None, timeout, logger).await
    }

    /// Connects with every pooled session's `search_path` set to `schema`, creating the
    /// schema when needed. Lets several independent stores share one database.
    pub async fn connect_in_schema(url: &str, schema: Option<&str>, timeout: Duration, logger: Logger) -> Result<Self> {
        let mut options = PgPoolOptions::new().max_connections(5).acquire_timeout(timeout);
        if let Some(schema) = schema {
            if schema.is_empty() || !schema.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(Error::Config(format!("Invalid schema name: {:?}", schema)));
            }
            let statement = format!("SET search_path TO \"{}\"", schema);
            options = options.after_connect(move |conn, _meta| {
                let statement = statement.clone();
                Box::pin(async move {
                    conn.execute(statement.as_str()).await?;
                    Ok(())
                })
            });
        }

        let pool = tokio::time::timeout(timeout, options.connect(url))
            .await
            .map_err(|_| Error::Timeout(timeout))?
            .map_err(db_error("Failed to connect to database"))?;

        if let Some(schema) = schema {
            pool.execute(format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema).as_str())
                .await
                .map_err(db_error("Failed to create schema"))?;
        }
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool, logger })
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
        let mut separator = " WHERE ";
        if let Some(topic) = &filter.topic {
            builder.push(separator).push_bind(topic.clone()).push(" = ANY(topics)");
            separator = " AND ";
        }
        if let Some(source) = &filter.source {
            builder.push(separator).push("source = ").push_bind(source.clone());
        }
    }

    async fn summary(&self, sql: &'static str) -> Result<Vec<LabelCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to aggregate articles"))?;
        Ok(rows
            .into_iter()
            .map(|(label, count)| LabelCount { label, count: count as usize })
            .collect())
    }
}

#[async_trait]
impl StorageBackend for PostgresStorage {
    fn get_error_message() -> &'static str {
        "PostgreSQL should be reachable at DATABASE_URL"
    }

    async fn connect(config: &StorageConfig, logger: Logger) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| Error::Config("postgres storage requires a database URL".to_string()))?;
        Self::connect_url(url, config.connect_timeout(), logger).await
    }
}

#[async_trait]
impl ArticleStorage for PostgresStorage {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn save(&self, article: &Article) -> Result<SaveStatus> {
        let (id, record) = prepare_for_save(article).map_err(|e| {
            self.logger.warn(&format!("Cannot save \"{}\": {}", article.title, e));
            e
        })?;

        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        let existing: Option<Json<Article>> =
            sqlx::query_scalar("SELECT document FROM articles WHERE article_id = $1 FOR UPDATE")
                .bind(&id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to read article"))?;

        let (merged, status) = merge_upsert(existing.as_ref().map(|doc| &doc.0), record);
        if status != SaveStatus::Unchanged {
            sqlx::query(
                r#"
                INSERT INTO articles (article_id, document, source, topics, scraped_at, published, title)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (article_id) DO UPDATE SET
                    document = EXCLUDED.document,
                    source = EXCLUDED.source,
                    topics = EXCLUDED.topics,
                    published = EXCLUDED.published,
                    title = EXCLUDED.title
                "#,
            )
            .bind(&id)
            .bind(Json(&merged))
            .bind(&merged.source)
            .bind(&merged.topics)
            .bind(merged.scraped_at)
            .bind(&merged.published)
            .bind(&merged.title)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to store article"))?;
        }
        tx.commit().await.map_err(db_error("Failed to commit article"))?;

        self.logger.debug(&format!("{:?} {}", status, id));
        Ok(status)
    }

    async fn get_by_id(&self, article_id: &str) -> Result<Option<Article>> {
        let document: Option<Json<Article>> = sqlx::query_scalar("SELECT document FROM articles WHERE article_id = $1")
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to read article"))?;
        Ok(document.map(|doc| doc.0))
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT document FROM articles");
        Self::push_filter(&mut builder, &query.filter);

        // byte-order collation so ordering matches the scanning backends
        let column = match query.sort.field {
            SortField::ScrapedAt => "scraped_at",
            SortField::Published => "published COLLATE \"C\"",
            SortField::Title => "title COLLATE \"C\"",
        };
        let direction = if query.sort.descending { "DESC" } else { "ASC" };
        builder.push(format!(" ORDER BY {} {}, article_id COLLATE \"C\" ASC", column, direction));
        builder
            .push(" LIMIT ")
            .push_bind(query.limit as i64)
            .push(" OFFSET ")
            .push_bind(query.skip as i64);

        let documents: Vec<Json<Article>> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to query articles"))?;
        Ok(documents.into_iter().map(|doc| doc.0).collect())
    }

    async fn count(&self, filter: &ArticleFilter) -> Result<usize> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        Self::push_filter(&mut builder, filter);
        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count articles"))?;
        Ok(count as usize)
    }

    async fn topics_summary(&self) -> Result<Vec<LabelCount>> {
        self.summary(
            r#"
            SELECT t.label, COUNT(*) AS count
            FROM articles CROSS JOIN LATERAL unnest(topics) AS t(label)
            GROUP BY t.label
            ORDER BY COUNT(*) DESC, t.label COLLATE "C" ASC
            "#,
        )
        .await
    }

    async fn sources_summary(&self) -> Result<Vec<LabelCount>> {
        self.summary(
            r#"
            SELECT source AS label, COUNT(*) AS count
            FROM articles
            GROUP BY source
            ORDER BY COUNT(*) DESC, source COLLATE "C" ASC
            "#,
        )
        .await
    }
}
