// file: src/mcp/server.rs
// description: MCP server exposing dbSNP lookup, search and clinical significance tools
// reference: https://docs.rs/rmcp

use crate::client::DbSnpClient;
use crate::error::{DbSnpError, Result as DbSnpResult};
use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const SNP_RESOURCE_PREFIX: &str = "snp://";

const INSTRUCTIONS: &str = "\
Look up single nucleotide polymorphisms in NCBI dbSNP.
- get_snp_by_rs: chromosome, GRCh38/GRCh37 position, alleles, genes and functional class for an rs ID (e.g. rs6311)
- search_snps: rs IDs matching a term such as a gene symbol (BRCA1), a phenotype or an rs ID, in NCBI relevance order
- get_snp_clinical_significance: ClinVar classifications (pathogenic, benign, ...) with their associated conditions
The same SNP record is readable as the resource snp://{rs_id}.
Failed calls return {\"error\": kind, \"message\": text} where kind is invalid_argument, upstream_unavailable or rate_limited. \
On rate_limited, wait before retrying; configuring NCBI_API_KEY raises the limit from 3 to 10 requests per second.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RsIdRequest {
    #[schemars(description = "dbSNP reference SNP identifier, e.g. rs6311 (case-insensitive)")]
    pub rs_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchSnpsRequest {
    #[schemars(description = "Search term, e.g. a gene symbol (BRCA1), phenotype (HTN) or rs ID")]
    pub term: String,
    #[schemars(description = "Maximum number of results to return (default: 10, capped at 50)")]
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct DbSnpMcp {
    client: Arc<DbSnpClient>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DbSnpMcp {
    pub fn new(client: DbSnpClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    pub fn get_tool_router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(description = "Retrieve SNP data (location, alleles, genes, functional class) for a dbSNP rs ID")]
    async fn get_snp_by_rs(
        &self,
        Parameters(RsIdRequest { rs_id }): Parameters<RsIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: get_snp_by_rs {}", rs_id);
        tool_result(self.client.get_snp_by_rs(&rs_id).await)
    }

    #[tool(description = "Search dbSNP for SNPs matching a term and return their summaries in relevance order")]
    async fn search_snps(
        &self,
        Parameters(SearchSnpsRequest { term, limit }): Parameters<SearchSnpsRequest>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: search_snps '{}' (limit: {:?})", term, limit);
        tool_result(self.client.search_snps(&term, limit).await)
    }

    #[tool(description = "Retrieve clinical significance classifications and associated conditions for a dbSNP rs ID")]
    async fn get_snp_clinical_significance(
        &self,
        Parameters(RsIdRequest { rs_id }): Parameters<RsIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: get_snp_clinical_significance {}", rs_id);
        tool_result(self.client.get_snp_clinical_significance(&rs_id).await)
    }
}

impl DbSnpMcp {
    fn resource_templates() -> Vec<ResourceTemplate> {
        vec![
            RawResourceTemplate {
                uri_template: format!("{}{{rs_id}}", SNP_RESOURCE_PREFIX),
                name: "snp".to_string(),
                description: Some("dbSNP record for an rs ID, e.g. snp://rs6311".to_string()),
                mime_type: Some("application/json".to_string()),
            }
            .no_annotation(),
        ]
    }

    async fn read_snp_resource(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        info!("MCP: read_resource {}", uri);

        let rs_id = uri.strip_prefix(SNP_RESOURCE_PREFIX).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown resource: {}", uri),
                Some(serde_json::json!({ "uri": uri })),
            )
        })?;

        match self.client.get_snp_by_rs(rs_id).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result).map_err(|e| {
                    McpError::internal_error(format!("Failed to serialize result: {}", e), None)
                })?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(text, uri)],
                })
            }
            Err(e) => {
                warn!("MCP: resource read failed: {}", e);
                let data = Some(serde_json::json!({ "error": e.kind(), "uri": uri }));
                if matches!(e, DbSnpError::InvalidArgument(_)) {
                    Err(McpError::invalid_params(e.to_string(), data))
                } else {
                    Err(McpError::internal_error(e.to_string(), data))
                }
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for DbSnpMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult {
            resource_templates: Self::resource_templates(),
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_snp_resource(&uri).await
    }
}

/// Records become pretty JSON text; adapter errors become error-flagged
/// results so the calling agent can read the kind and react.
fn tool_result<T: Serialize>(outcome: DbSnpResult<T>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).map_err(|e| {
                McpError::internal_error(format!("Failed to serialize result: {}", e), None)
            })?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(e) => {
            warn!("MCP: tool call failed: {}", e);
            let payload = serde_json::json!({
                "error": e.kind(),
                "message": e.to_string(),
            });
            Ok(CallToolResult::error(vec![Content::text(payload.to_string())]))
        }
    }
}
