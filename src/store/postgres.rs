use async_trait::async_trait;
use chrono::Utc;
use error_stack::ResultExt;
use sqlx::{Postgres, QueryBuilder};

use super::{
    CompanyFilter, CompanyPatch, CompanyStore, NewCompany, NewUser, Result, StoreError,
    UserFilter, UserPatch, UserStore,
};
use crate::database::Pool;
use crate::models::{Company, CompanyId, User, UserId};

/// User records backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn push_user_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter<'_>) {
    match filter {
        UserFilter::All => {}
        UserFilter::ById(id) => {
            query.push(" WHERE id = ").push_bind(*id);
        }
        UserFilter::ByEmail(email) => {
            query.push(" WHERE email = ").push_bind((*email).to_string());
        }
        UserFilter::ByAdmin(id) => {
            query.push(" WHERE admin_id = ").push_bind(*id);
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[tracing::instrument(name = "store.users.find_one", skip(self))]
    async fn find_one(&self, filter: UserFilter<'_>) -> Result<Option<User>> {
        let mut query = QueryBuilder::new(r#"SELECT * FROM "users""#);
        push_user_filter(&mut query, &filter);
        query.push(" LIMIT 1");

        query
            .build_query_as::<User>()
            .fetch_optional(self.pool.inner())
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(name = "store.users.find_many", skip(self))]
    async fn find_many(&self, filter: UserFilter<'_>, skip: u64, limit: u64) -> Result<Vec<User>> {
        let mut query = QueryBuilder::new(r#"SELECT * FROM "users""#);
        push_user_filter(&mut query, &filter);
        query.push(" ORDER BY created_at ASC");
        query.push(" OFFSET ").push_bind(skip as i64);
        query.push(" LIMIT ").push_bind(limit as i64);

        query
            .build_query_as::<User>()
            .fetch_all(self.pool.inner())
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(name = "store.users.count", skip(self))]
    async fn count(&self, filter: UserFilter<'_>) -> Result<u64> {
        let mut query = QueryBuilder::new(r#"SELECT COUNT(*) FROM "users""#);
        push_user_filter(&mut query, &filter);

        let (count,) = query
            .build_query_as::<(i64,)>()
            .fetch_one(self.pool.inner())
            .await
            .change_context(StoreError)?;

        Ok(count as u64)
    }

    #[tracing::instrument(name = "store.users.insert", skip(self, new))]
    async fn insert(&self, new: NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO "users"
               (id, email, password_hash, full_name, phone, role, admin_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(UserId::new())
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.full_name)
        .bind(new.phone)
        .bind(new.role)
        .bind(new.admin_id)
        .bind(Utc::now().naive_utc())
        .fetch_one(self.pool.inner())
        .await
        .change_context(StoreError)
        .attach_printable("could not insert user record")
    }

    #[tracing::instrument(name = "store.users.update", skip(self, patch))]
    async fn update_by_id(&self, id: UserId, patch: UserPatch) -> Result<u64> {
        if patch.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::new(r#"UPDATE "users" SET "#);
        {
            let mut set = query.separated(", ");
            set.push("updated_at = ");
            set.push_bind_unseparated(Utc::now().naive_utc());
            if let Some(email) = &patch.email {
                set.push("email = ");
                set.push_bind_unseparated(email.clone());
            }
            if let Some(full_name) = &patch.full_name {
                set.push("full_name = ");
                set.push_bind_unseparated(full_name.clone());
            }
            if let Some(phone) = &patch.phone {
                set.push("phone = ");
                set.push_bind_unseparated(phone.clone());
            }
        }

        query.push(" WHERE id = ").push_bind(id);

        // Guard against writes that change nothing, so the affected-row
        // count reflects real modifications even under concurrent edits.
        query.push(" AND (");
        {
            let mut guard = query.separated(" OR ");
            if let Some(email) = patch.email {
                guard.push("email IS DISTINCT FROM ");
                guard.push_bind_unseparated(email);
            }
            if let Some(full_name) = patch.full_name {
                guard.push("full_name IS DISTINCT FROM ");
                guard.push_bind_unseparated(full_name);
            }
            if let Some(phone) = patch.phone {
                guard.push("phone IS DISTINCT FROM ");
                guard.push_bind_unseparated(phone);
            }
        }
        query.push(")");

        let result = query
            .build()
            .execute(self.pool.inner())
            .await
            .change_context(StoreError)?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "store.users.delete", skip(self))]
    async fn delete_by_id(&self, id: UserId) -> Result<u64> {
        let result = sqlx::query(r#"DELETE FROM "users" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool.inner())
            .await
            .change_context(StoreError)?;

        Ok(result.rows_affected())
    }
}

/// Company records backed by the `companies` table.
#[derive(Debug, Clone)]
pub struct PgCompanyStore {
    pool: Pool,
}

impl PgCompanyStore {
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn push_company_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &CompanyFilter) {
    if filter.is_empty() {
        return;
    }

    query.push(" WHERE ");
    let mut clauses = query.separated(" AND ");
    if let Some(name) = &filter.company_name {
        clauses.push("company_name ILIKE ");
        clauses.push_bind_unseparated(format!("%{name}%"));
    }
    if let Some(country) = &filter.country {
        clauses.push("country ILIKE ");
        clauses.push_bind_unseparated(format!("%{country}%"));
    }
    if let Some(jurisdiction) = &filter.jurisdiction {
        clauses.push("jurisdiction ILIKE ");
        clauses.push_bind_unseparated(format!("%{jurisdiction}%"));
    }
}

macro_rules! patch_fields {
    ($patch:expr, $callback:ident) => {
        $callback!(jurisdiction, $patch.jurisdiction);
        $callback!(company_name, $patch.company_name);
        $callback!(company_address, $patch.company_address);
        $callback!(zip, $patch.zip);
        $callback!(country, $patch.country);
        $callback!(directors, $patch.directors);
        $callback!(shareholders, $patch.shareholders);
        $callback!(company_activities, $patch.company_activities);
        $callback!(sec_code, $patch.sec_code);
    };
}

#[async_trait]
impl CompanyStore for PgCompanyStore {
    #[tracing::instrument(name = "store.companies.find_by_id", skip(self))]
    async fn find_by_id(&self, id: CompanyId) -> Result<Option<Company>> {
        sqlx::query_as::<_, Company>(r#"SELECT * FROM "companies" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(self.pool.inner())
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(name = "store.companies.find_many", skip(self))]
    async fn find_many(
        &self,
        filter: &CompanyFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Company>> {
        let mut query = QueryBuilder::new(r#"SELECT * FROM "companies""#);
        push_company_filter(&mut query, filter);
        query.push(" ORDER BY created_at ASC");
        query.push(" OFFSET ").push_bind(skip as i64);
        query.push(" LIMIT ").push_bind(limit as i64);

        query
            .build_query_as::<Company>()
            .fetch_all(self.pool.inner())
            .await
            .change_context(StoreError)
    }

    #[tracing::instrument(name = "store.companies.count", skip(self))]
    async fn count(&self, filter: &CompanyFilter) -> Result<u64> {
        let mut query = QueryBuilder::new(r#"SELECT COUNT(*) FROM "companies""#);
        push_company_filter(&mut query, filter);

        let (count,) = query
            .build_query_as::<(i64,)>()
            .fetch_one(self.pool.inner())
            .await
            .change_context(StoreError)?;

        Ok(count as u64)
    }

    #[tracing::instrument(name = "store.companies.insert", skip(self, new))]
    async fn insert(&self, new: NewCompany) -> Result<Option<Company>> {
        sqlx::query_as::<_, Company>(
            r#"INSERT INTO "companies"
               (id, jurisdiction, company_name, company_address, zip, country,
                directors, shareholders, company_activities, sec_code, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING *"#,
        )
        .bind(CompanyId::new())
        .bind(new.jurisdiction)
        .bind(new.company_name)
        .bind(new.company_address)
        .bind(new.zip)
        .bind(new.country)
        .bind(new.directors)
        .bind(new.shareholders)
        .bind(new.company_activities)
        .bind(new.sec_code)
        .bind(Utc::now().naive_utc())
        .fetch_optional(self.pool.inner())
        .await
        .change_context(StoreError)
        .attach_printable("could not insert company record")
    }

    #[tracing::instrument(name = "store.companies.update", skip(self, patch))]
    async fn update_by_id(&self, id: CompanyId, patch: CompanyPatch) -> Result<u64> {
        if patch.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::new(r#"UPDATE "companies" SET "#);
        {
            let mut set = query.separated(", ");
            set.push("updated_at = ");
            set.push_bind_unseparated(Utc::now().naive_utc());

            macro_rules! push_set {
                ($column:ident, $value:expr) => {
                    if let Some(value) = &$value {
                        set.push(concat!(stringify!($column), " = "));
                        set.push_bind_unseparated(value.clone());
                    }
                };
            }
            patch_fields!(patch, push_set);
        }

        query.push(" WHERE id = ").push_bind(id);

        // Same changed-row guard as the user store.
        query.push(" AND (");
        {
            let mut guard = query.separated(" OR ");

            macro_rules! push_guard {
                ($column:ident, $value:expr) => {
                    if let Some(value) = $value {
                        guard.push(concat!(stringify!($column), " IS DISTINCT FROM "));
                        guard.push_bind_unseparated(value);
                    }
                };
            }
            patch_fields!(patch, push_guard);
        }
        query.push(")");

        let result = query
            .build()
            .execute(self.pool.inner())
            .await
            .change_context(StoreError)?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "store.companies.delete", skip(self))]
    async fn delete_by_id(&self, id: CompanyId) -> Result<u64> {
        let result = sqlx::query(r#"DELETE FROM "companies" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool.inner())
            .await
            .change_context(StoreError)?;

        Ok(result.rows_affected())
    }
}
