//! HTTP route modules.
//!
//! | Prefix | Module | Role |
//! |---|---|---|
//! | `/v1/aliases*` | [`aliases`] | citizen |
//! | `/v1/consents*` | [`consents`] | citizen |
//! | `/v1/verify`, `/v1/verifications` | [`verify`] | org user |
//! | `/v1/audit` | [`audit`] | admin |
//! | `/v1/citizens*`, `/v1/organizations` | [`directory`] | admin |

pub mod aliases;
pub mod audit;
pub mod consents;
pub mod directory;
pub mod verify;

use nidpass_audit::AuditEvent;

use crate::error::AppError;
use crate::state::AppState;

/// Record an audit event: mirror to Postgres first when configured, then
/// append to the in-memory log. A persist failure surfaces as an error
/// before anything is recorded, so the two sinks cannot diverge.
pub(crate) async fn record_audit(state: &AppState, event: AuditEvent) -> Result<(), AppError> {
    if let Some(pool) = &state.db_pool {
        crate::db::audit::insert_audit_event(pool, &event).await?;
    }
    state.audit.append(event);
    Ok(())
}
