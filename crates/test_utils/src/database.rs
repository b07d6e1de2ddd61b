//! Database Test Utilities
//!
//! Provides helpers for database testing including testcontainer management
//! and connection pooling for integration tests.

use std::sync::Arc;
use std::time::Duration;

use fake::faker::internet::en::Username;
use fake::Fake;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

use core_kernel::{HouseholdId, UserId};
use domain_bills::SettlementService;
use infra_db::repositories::HouseholdRepository;
use infra_db::{PostgresBillStore, PostgresHouseholdDirectory};

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Default PostgreSQL image for testing
const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "bills_test";

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container with the schema applied
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or the schema fails
    /// to apply
    pub async fn new() -> TestResult<Self> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..TestDatabaseConfig::default()
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        let test_db = Self {
            _container: container,
            config,
            pool,
        };
        test_db.init_schema().await?;

        Ok(test_db)
    }

    async fn init_schema(&self) -> TestResult<()> {
        let schema = include_str!("../../../migrations/20240101_000001_initial_schema.sql");
        sqlx::raw_sql(schema).execute(&self.pool).await?;
        Ok(())
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Clears all rows while preserving the schema
    pub async fn clear_data(&self) -> TestResult<()> {
        sqlx::query("TRUNCATE TABLE bill_split, bill, users, households CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a household with `size` members
    pub async fn seed_household(&self, size: usize) -> TestResult<(HouseholdId, Vec<UserId>)> {
        let repo = HouseholdRepository::new(self.pool.clone());
        let household = HouseholdId::new();
        repo.create_household(*household.as_uuid(), "Test Flat").await?;

        let mut members = Vec::with_capacity(size);
        for _ in 0..size {
            let user = self.seed_user(Some(household)).await?;
            members.push(user);
        }
        Ok((household, members))
    }

    /// Inserts a user, optionally inside a household
    pub async fn seed_user(&self, household: Option<HouseholdId>) -> TestResult<UserId> {
        let repo = HouseholdRepository::new(self.pool.clone());
        let user = UserId::new();
        let name: String = Username().fake();
        // usernames are UNIQUE in the schema
        let username = format!("{}-{}", name, user.as_uuid().simple());
        repo.create_user(*user.as_uuid(), &username, household.map(|h| *h.as_uuid()))
            .await?;
        Ok(user)
    }

    /// A settlement service backed by this database
    pub fn settlement_service(&self) -> SettlementService {
        SettlementService::new(
            Arc::new(PostgresBillStore::new(self.pool.clone())),
            Arc::new(PostgresHouseholdDirectory::new(self.pool.clone())),
        )
    }
}

/// Global test database for shared integration tests
static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// # Panics
///
/// Panics if the database fails to initialize
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> TestResult<TestDatabase> {
    TestDatabase::new().await
}

/// Declares a Docker-backed test that receives its own database
///
/// ```rust,ignore
/// db_test!(test_insert, db, {
///     let (_, members) = db.seed_household(2).await.unwrap();
/// });
/// ```
#[macro_export]
macro_rules! db_test {
    ($name:ident, $db:ident, $body:block) => {
        #[tokio::test]
        #[ignore = "requires Docker"]
        async fn $name() {
            let $db = $crate::database::create_isolated_test_database()
                .await
                .expect("Failed to create test database");
            $body
        }
    };
}
