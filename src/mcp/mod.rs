//! MCP (Model Context Protocol) server for the helpdesk.
//!
//! Exposes reporting, triage and resolution of issues as tools, and the
//! statistics and knowledge-base views as read-only resources.

pub mod error;
pub mod resources;
pub mod tools;

use crate::config::HelpdeskConfig;
use crate::entity::{NewIssue, UserRef};
use crate::error::{HelpdeskError, Result as HelpdeskResult};
use crate::knowledge::articles_by_category;
use crate::lifecycle::{self, Action};
use crate::resolution::{resolving_days, with_resolving_times};
use crate::search::parse_query;
use crate::stats::Statistics;
use crate::storage::{IssueRepository, SqliteStore};
use chrono::{Local, Utc};
use error::McpError;
use rmcp::{
    handler::server::wrapper::Parameters,
    model::*,
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router, ErrorData as McpErrorData, ServerHandler,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tools::*;

/// Path the streamable HTTP transport is mounted on.
pub const HTTP_MCP_PATH: &str = "/mcp";

/// The MCP server for the helpdesk.
///
/// Cheap to clone: the HTTP transport builds one instance per session, all
/// sharing the same store.
#[derive(Clone)]
pub struct HelpdeskServer {
    pub store: Arc<Mutex<SqliteStore>>,
    pub config: HelpdeskConfig,
    /// Tool router for MCP tool handling.
    pub tool_router: rmcp::handler::server::tool::ToolRouter<Self>,
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpErrorData> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::InternalError {
        message: format!("Failed to serialize response: {}", e),
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[tool_router]
impl HelpdeskServer {
    pub fn new(store: SqliteStore, config: HelpdeskConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            config,
            tool_router: Self::tool_router(),
        }
    }

    /// Run the server on the given transport until it is closed.
    pub async fn serve<T, E, A>(self, transport: T) -> HelpdeskResult<()>
    where
        T: rmcp::transport::IntoTransport<RoleServer, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        use rmcp::service::ServiceExt;
        let running = ServiceExt::serve(self, transport)
            .await
            .map_err(|e| HelpdeskError::Server(e.to_string()))?;
        running
            .waiting()
            .await
            .map_err(|e| HelpdeskError::Server(e.to_string()))?;
        Ok(())
    }

    /// Serve over stdin/stdout.
    pub async fn serve_stdio(self) -> HelpdeskResult<()> {
        tracing::info!("serving MCP over stdio");
        self.serve(rmcp::transport::stdio()).await
    }

    /// Serve streamable HTTP on `addr` until Ctrl-C.
    pub async fn serve_http(self, addr: &str) -> HelpdeskResult<()> {
        use rmcp::transport::streamable_http_server::{
            session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
        };

        let service = StreamableHttpService::new(
            move || Ok(self.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig::default(),
        );
        let router = axum::Router::new().nest_service(HTTP_MCP_PATH, service);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("serving MCP over HTTP on {}{}", addr, HTTP_MCP_PATH);

        let ct = CancellationToken::new();
        let shutdown = ct.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received Ctrl-C, shutting down");
                shutdown.cancel();
            }
        });

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { ct.cancelled_owned().await })
            .await?;
        Ok(())
    }

    /// Ping tool for health checks.
    #[tool(description = "Check if the server is running")]
    async fn ping(&self) -> Result<CallToolResult, McpErrorData> {
        Ok(CallToolResult::success(vec![Content::text("pong")]))
    }

    // ========================================================================
    // Reporting and reading
    // ========================================================================

    #[tool(description = "Report a new issue. It starts in state New with no assignee.")]
    pub async fn issue_report(
        &self,
        Parameters(params): Parameters<IssueReportParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        validate_title(&params.title)?;
        validate_optional_text("description", &params.description)?;

        let store = self.store.lock().await;
        let category = store.lookup_category(&params.category)?;
        let reporter = store.lookup_user(&params.reporter)?;

        let new_issue = NewIssue::new(
            params.title.trim().to_string(),
            params.description.unwrap_or_default(),
            category.id,
            reporter.id,
        );
        let issue = store.insert_issue(&new_issue)?;
        tracing::info!(id = issue.id, "issue reported");

        json_result(&issue)
    }

    #[tool(description = "Get an issue with its resolving time, keywords and comments")]
    pub async fn issue_get(
        &self,
        Parameters(params): Parameters<IssueIdParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        let store = self.store.lock().await;
        let issue = store
            .fetch_issue(params.id)?
            .ok_or_else(|| HelpdeskError::not_found("Issue", params.id))?;

        let detail = IssueDetail {
            resolving_time: resolving_days(&issue.date_reported, &issue.state, &Local::now()),
            keywords: store
                .list_issue_keywords(issue.id)?
                .into_iter()
                .map(|k| k.keyword)
                .collect(),
            comments: store.list_comments(issue.id)?,
            issue,
        };

        json_result(&detail)
    }

    #[tool(
        description = "List issues in report order. Query accepts category:, state:, assignee:, reporter:, reported:>DATE, reported:<DATE and free-text terms."
    )]
    pub async fn issue_list(
        &self,
        Parameters(params): Parameters<IssueListParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        let (limit, offset) = page_bounds(params.limit, params.offset);
        let store = self.store.lock().await;

        let issues = match (&params.assigned_to, &params.reported_by) {
            (Some(staff), _) => {
                let staff = store.lookup_user(staff)?;
                store.fetch_issues_assigned_to(staff.id)?
            }
            (None, Some(reporter)) => {
                let reporter = store.lookup_user(reporter)?;
                store.fetch_issues_created_by(reporter.id)?
            }
            (None, None) => store.fetch_all_issues()?,
        };

        let filter = parse_query(params.query.as_deref().unwrap_or(""));
        let issues = filter.apply(issues);
        let total = issues.len();
        let page: Vec<_> = issues.into_iter().skip(offset).take(limit).collect();

        json_result(&IssueListResult {
            issues: with_resolving_times(page, &Local::now()),
            total,
            limit,
            offset,
        })
    }

    // ========================================================================
    // Lifecycle actions
    // ========================================================================

    #[tool(description = "Assign an issue to an IT staff member. The state is left unchanged.")]
    pub async fn issue_assign(
        &self,
        Parameters(params): Parameters<IssueStaffParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        let store = self.store.lock().await;
        let staff = store.lookup_user(&params.staff)?;
        require_staff(&staff)?;

        let action = Action::Assign { staff_id: staff.id };
        self.run_action(&store, params.id, action)
    }

    #[tool(description = "An IT staff member takes an issue; the state becomes In Progress")]
    pub async fn issue_nominate(
        &self,
        Parameters(params): Parameters<IssueStaffParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        let store = self.store.lock().await;
        let staff = store.lookup_user(&params.staff)?;
        require_staff(&staff)?;

        let action = Action::Nominate {
            staff: UserRef::new(staff.id, staff.full_name()),
        };
        self.run_action(&store, params.id, action)
    }

    #[tool(description = "Add a comment to an issue. The issue itself is not modified.")]
    pub async fn issue_comment(
        &self,
        Parameters(params): Parameters<IssueCommentParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        validate_text("text", &params.text)?;

        let store = self.store.lock().await;
        let user = store.lookup_user(&params.user)?;
        let issue = store
            .fetch_issue(params.id)?
            .ok_or_else(|| HelpdeskError::not_found("Issue", params.id))?;

        let comment =
            store.insert_comment(&lifecycle::comment(&issue, user.id, params.text, Utc::now()))?;
        json_result(&comment)
    }

    #[tool(description = "Mark an issue Resolved with resolution details")]
    pub async fn issue_resolve(
        &self,
        Parameters(params): Parameters<IssueResolveParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        validate_text("resolution", &params.resolution)?;

        let store = self.store.lock().await;
        let action = Action::Resolve {
            resolution: params.resolution,
        };
        self.run_action(&store, params.id, action)
    }

    #[tool(description = "Set an issue's state label, e.g. \"In Progress\" or \"Blocked\"")]
    pub async fn issue_update_state(
        &self,
        Parameters(params): Parameters<IssueUpdateStateParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        if params.state.trim().is_empty() {
            return Err(McpError::ValidationFailed {
                field: "state".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }

        let store = self.store.lock().await;
        let action = Action::UpdateState {
            state: params.state.trim().to_string(),
        };
        self.run_action(&store, params.id, action)
    }

    #[tool(description = "Close an issue; the state becomes Completed")]
    pub async fn issue_finalize(
        &self,
        Parameters(params): Parameters<IssueIdParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        let store = self.store.lock().await;
        self.run_action(&store, params.id, Action::Finalize)
    }

    // ========================================================================
    // Views
    // ========================================================================

    #[tool(
        description = "Statistics: issues per category, state and staff, average resolution time and the longest unresolved issues"
    )]
    pub async fn statistics(&self) -> Result<CallToolResult, McpErrorData> {
        let store = self.store.lock().await;
        let stats = Statistics::collect(&*store, &Utc::now(), &self.config.stats_options())?;
        json_result(&stats)
    }

    #[tool(description = "Resolved issues grouped by category, optionally for one category")]
    pub async fn knowledge_base(
        &self,
        Parameters(params): Parameters<KnowledgeBaseParams>,
    ) -> Result<CallToolResult, McpErrorData> {
        let store = self.store.lock().await;
        let issues = store.fetch_all_issues()?;
        json_result(&articles_by_category(&issues, params.category.as_deref()))
    }
}

impl HelpdeskServer {
    fn run_action(
        &self,
        store: &SqliteStore,
        id: i64,
        action: Action,
    ) -> Result<CallToolResult, McpErrorData> {
        let issue = lifecycle::execute(
            store,
            id,
            &action,
            Utc::now(),
            self.config.transition_policy,
        )?;
        tracing::info!(id, action = action.name(), state = %issue.state, "issue updated");
        json_result(&issue)
    }
}

#[tool_handler]
impl ServerHandler for HelpdeskServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Helpdesk is an IT issue tracker. Users report issues; IT staff \
                 nominate, comment on and resolve them; managers assign and \
                 finalize. Use the statistics and knowledge_base tools or the \
                 helpdesk:// resources for read-only views."
                    .to_string(),
            ),
        }
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, rmcp::ErrorData>> + Send + '_
    {
        use rmcp::model::AnnotateAble;
        async move {
            Ok(ListResourcesResult {
                resources: resources::build_static_resources()
                    .into_iter()
                    .map(|r| r.no_annotation())
                    .collect(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourceTemplatesResult, rmcp::ErrorData>>
           + Send
           + '_ {
        use rmcp::model::AnnotateAble;
        async move {
            let templates = resources::build_resource_templates();
            Ok(ListResourceTemplatesResult {
                resource_templates: templates.into_iter().map(|t| t.no_annotation()).collect(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, rmcp::ErrorData>> + Send + '_
    {
        async move {
            resources::read_resource(&request.uri, &self.store, &self.config)
                .await
                .map_err(McpErrorData::from)
        }
    }
}
