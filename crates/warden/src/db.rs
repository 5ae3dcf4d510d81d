mod builder;
pub use builder::Builder;

mod connect;
pub use connect::Connect;

mod pool;
pub use pool::{Pool, PoolConnection};

use crate::{
    cache::MetadataCache,
    engine::{
        exec, policy, records, view, Authorization, ConditionIssue, ExecuteRequest, FieldResolver,
        Page, QueryPlan, RecordQuery, Scope, ViewPage,
    },
    Catalog, Config,
};

use warden_core::{
    policy::Action,
    schema::{CollectionId, CollectionRef, Registry},
    Condition, Error, Policy, Principal, Result, Schema, View,
};

use chrono::{DateTime, Utc};
use std::{future::Future, sync::Arc};
use tracing::{field, info_span, Instrument, Span};

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pub(crate) catalog: Box<dyn Catalog>,
    pub(crate) cache: MetadataCache,
    pub(crate) pool: Pool,
    pub(crate) config: Config,
}

/// Entry point for authorizing and running queries against one store.
///
/// Cloning is cheap; clones share the connection pool and metadata cache.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Decides whether `principal` may perform `action` on a collection and
    /// returns the row filter that applies.
    pub async fn authorize(
        &self,
        project: &str,
        collection: &str,
        action: Action,
        principal: &Principal,
    ) -> Result<Authorization> {
        let span = info_span!(
            "warden.authorize",
            project,
            collection,
            %action,
            principal = %principal.kind(),
            outcome = field::Empty,
        );

        traced(span, async {
            let now = Utc::now();
            let schema = self.schema(project).await?;
            let collection = schema
                .lookup_collection(collection, now)
                .ok_or_else(Error::authorization_denied)?;

            self.authorize_in(project, &schema, &collection, action, principal, now)
                .await
        })
        .await
    }

    /// Compiles a view into a plan that can be cached and run later with
    /// [`Db::execute_plan`]. Does not authorize.
    pub async fn compile_plan(
        &self,
        project: &str,
        view_name: &str,
        principal: &Principal,
        request: &ExecuteRequest,
    ) -> Result<QueryPlan> {
        let span = info_span!(
            "warden.compile_plan",
            project,
            view = view_name,
            principal = %principal.kind(),
            outcome = field::Empty,
        );

        traced(span, async {
            let now = Utc::now();
            let schema = self.schema(project).await?;
            let view = self.view(project, view_name).await?;
            let collection = base_collection(&schema, &view)?;

            let scope = scope(&schema, &collection, principal, now);
            view::compile(&view, collection.table.clone(), &scope, request, &self.shared.config)
        })
        .await
    }

    /// Authorizes `list` and runs a previously compiled plan.
    ///
    /// Fails with a stale plan error if the view or the schema changed since
    /// the plan was compiled.
    pub async fn execute_plan(
        &self,
        project: &str,
        plan: &QueryPlan,
        principal: &Principal,
    ) -> Result<Page> {
        let span = info_span!(
            "warden.execute_plan",
            project,
            collection = %plan.collection_id,
            principal = %principal.kind(),
            outcome = field::Empty,
        );

        traced(span, async {
            let now = Utc::now();

            if let Some(stamp) = &plan.view {
                let view = self.view(project, &stamp.name).await?;

                if view.version != stamp.version {
                    return Err(Error::plan_stale(&stamp.name, stamp.version, view.version));
                }
            }

            let schema = self.schema(project).await?;

            if schema.version != plan.schema_version {
                return Err(Error::plan_stale_schema(plan.schema_version, schema.version));
            }

            let collection = schema
                .collection_by_id(&plan.collection_id)
                .ok_or_else(Error::authorization_denied)?;

            let authorization = self
                .authorize_in(project, &schema, &collection, Action::List, principal, now)
                .await?;

            self.execute(plan, &authorization).await
        })
        .await
    }

    /// Authorizes `list` on the view's collection, compiles the view and
    /// runs it.
    pub async fn compile_and_execute(
        &self,
        project: &str,
        view_name: &str,
        principal: &Principal,
        request: &ExecuteRequest,
    ) -> Result<ViewPage> {
        let span = info_span!(
            "warden.compile_and_execute",
            project,
            view = view_name,
            principal = %principal.kind(),
            rows = field::Empty,
            outcome = field::Empty,
        );

        traced(span, async {
            let now = Utc::now();
            let schema = self.schema(project).await?;
            let view = self.view(project, view_name).await?;
            let collection = base_collection(&schema, &view)?;

            let authorization = self
                .authorize_in(project, &schema, &collection, Action::List, principal, now)
                .await?;

            let scope = scope(&schema, &collection, principal, now);
            let plan = view::compile(
                &view,
                collection.table.clone(),
                &scope,
                request,
                &self.shared.config,
            )?;

            let page = self.execute(&plan, &authorization).await?;
            Span::current().record("rows", page.rows.len());

            Ok(ViewPage {
                data: page.rows,
                total: page.total,
                limit: page.limit,
                offset: page.offset,
                view_name: view.name.clone(),
                view_version: view.version,
            })
        })
        .await
    }

    /// Authorizes `list` and runs a client-supplied listing of a collection.
    pub async fn list_records(
        &self,
        project: &str,
        collection: &str,
        principal: &Principal,
        query: &RecordQuery,
    ) -> Result<Page> {
        let span = info_span!(
            "warden.list_records",
            project,
            collection,
            principal = %principal.kind(),
            rows = field::Empty,
            outcome = field::Empty,
        );

        traced(span, async {
            let now = Utc::now();
            let schema = self.schema(project).await?;
            let collection = schema
                .lookup_collection(collection, now)
                .ok_or_else(Error::authorization_denied)?;

            let authorization = self
                .authorize_in(project, &schema, &collection, Action::List, principal, now)
                .await?;

            let scope = scope(&schema, &collection, principal, now);
            let plan = records::compile(
                query,
                collection.table.clone(),
                &scope,
                &self.shared.config,
            )?;

            let page = self.execute(&plan, &authorization).await?;
            Span::current().record("rows", page.rows.len());
            Ok(page)
        })
        .await
    }

    /// Lists every problem with `condition` as a filter on `collection`.
    /// An empty list means the condition compiles.
    pub async fn validate(
        &self,
        project: &str,
        collection: &str,
        condition: &Condition,
    ) -> Result<Vec<ConditionIssue>> {
        let now = Utc::now();
        let schema = self.schema(project).await?;
        let collection = schema
            .lookup_collection(collection, now)
            .ok_or_else(Error::authorization_denied)?;

        let fields = FieldResolver {
            registry: &*schema,
            collection: collection.collection,
            now,
            hidden: true,
        };

        Ok(crate::engine::predicate::validate(condition, &fields))
    }

    pub async fn invalidate_schema(&self, project: &str) {
        self.shared.cache.schemas.invalidate(&project.to_string()).await;
    }

    pub async fn invalidate_policies(&self, project: &str, collection: &CollectionId) {
        self.shared
            .cache
            .policies
            .invalidate(&(project.to_string(), collection.clone()))
            .await;
    }

    pub async fn invalidate_view(&self, project: &str, view_name: &str) {
        self.shared
            .cache
            .views
            .invalidate(&(project.to_string(), view_name.to_string()))
            .await;
    }

    /// Drops every cached snapshot of a project.
    pub async fn invalidate_project(&self, project: &str) {
        let cache = &self.shared.cache;
        cache.schemas.invalidate_where(|key| key == project).await;
        cache.policies.invalidate_where(|(key, _)| key == project).await;
        cache.views.invalidate_where(|(key, _)| key == project).await;
    }

    async fn authorize_in(
        &self,
        project: &str,
        schema: &Schema,
        collection: &CollectionRef<'_>,
        action: Action,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<Authorization> {
        if !collection.is_active() {
            return Err(Error::authorization_denied());
        }

        let policies = self.policies(project, collection.id()).await?;
        let scope = scope(schema, collection, principal, now);

        policy::authorize(&policies, action, &scope)
    }

    async fn execute(&self, plan: &QueryPlan, authorization: &Authorization) -> Result<Page> {
        let mut connection = self.shared.pool.get().await?;

        exec::execute(
            &mut **connection,
            plan,
            &authorization.row_filter,
            self.shared.config.query_timeout,
        )
        .await
    }

    async fn schema(&self, project: &str) -> Result<Arc<Schema>> {
        let catalog = &self.shared.catalog;

        self.shared
            .cache
            .schemas
            .get_or_try_load(project.to_string(), || async move {
                Ok(catalog.schema(project).await?.map(|schema| {
                    let version = schema.version;
                    (schema, Some(version))
                }))
            })
            .await?
            .ok_or_else(Error::authorization_denied)
    }

    async fn policies(&self, project: &str, collection: &CollectionId) -> Result<Arc<[Policy]>> {
        let catalog = &self.shared.catalog;

        self.shared
            .cache
            .policies
            .get_or_try_load((project.to_string(), collection.clone()), || async move {
                let policies = catalog.policies(project, collection).await?;
                Ok(Some((Arc::from(policies), None)))
            })
            .await?
            .ok_or_else(Error::authorization_denied)
    }

    /// Loads an active view. Missing and inactive views are indistinguishable
    /// to the caller.
    async fn view(&self, project: &str, name: &str) -> Result<Arc<View>> {
        let catalog = &self.shared.catalog;

        self.shared
            .cache
            .views
            .get_or_try_load((project.to_string(), name.to_string()), || async move {
                Ok(catalog.view(project, name).await?.map(|view| {
                    let version = view.version;
                    (Arc::new(view), Some(version))
                }))
            })
            .await?
            .filter(|view| view.is_active)
            .ok_or_else(Error::authorization_denied)
    }
}

fn base_collection<'a>(schema: &'a Schema, view: &View) -> Result<CollectionRef<'a>> {
    schema
        .collection_by_id(&view.base_collection_id)
        .filter(|collection| collection.is_active())
        .ok_or_else(Error::authorization_denied)
}

fn scope<'a>(
    schema: &'a Schema,
    collection: &CollectionRef<'a>,
    principal: &'a Principal,
    now: DateTime<Utc>,
) -> Scope<'a> {
    Scope {
        fields: FieldResolver {
            registry: schema,
            collection: collection.collection,
            now,
            hidden: true,
        },
        principal,
    }
}

/// Runs `fut` inside `span` and records how it ended.
async fn traced<T>(span: Span, fut: impl Future<Output = Result<T>>) -> Result<T> {
    let result = fut.instrument(span.clone()).await;
    span.record("outcome", outcome(&result));
    result
}

fn outcome<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(err) if err.is_authorization_denied() => "denied",
        Err(err) if err.is_compile_error() => "rejected",
        Err(err) if err.is_plan_stale() => "stale",
        Err(_) => "error",
    }
}
