//! Routed execution: one policy evaluation, then read merge or write fan-out.
//!
//! Invariants:
//! - Policy is evaluated exactly once per trigger, before any backend call,
//!   and a policy failure aborts with zero backend calls made.
//! - Reads run primary-then-secondary sequentially and merge by
//!   concatenation in that order.
//! - Writes to both targets dispatch concurrently and resolve only after
//!   both settle; divergence surfaces as a partial write, never silently.
//! - A decision selecting no target completes successfully with an empty
//!   result.

use crate::{
    backend::BackendRole,
    db::{Router, proxy::ExecutionParts},
    error::RouterError,
    identity::IdentityContext,
    obs::RouterEvent,
    policy::RoutingDecision,
    response::{Response, WriteOutcome, WriteReport},
};
use tracing::{debug, warn};

pub(crate) async fn execute_read(parts: ExecutionParts<'_>) -> Result<Response, RouterError> {
    let ExecutionParts {
        router,
        kind,
        table,
        primary,
        secondary,
        identity,
    } = parts;

    let decision = resolve(router, &identity).await?;
    debug!(
        op = kind.as_str(),
        table = table.as_str(),
        identity = %identity,
        decision = %decision,
        "routing read"
    );

    let mut rows = Vec::new();

    if decision.read_primary {
        router.record(RouterEvent::ReadRouted {
            target: BackendRole::Primary,
        });
        let primary_rows = primary
            .execute()
            .await
            .map_err(|e| RouterError::backend(BackendRole::Primary, e))?;
        rows.extend(primary_rows);
    }

    if decision.read_secondary {
        router.record(RouterEvent::ReadRouted {
            target: BackendRole::Secondary,
        });
        let secondary_rows = secondary
            .execute()
            .await
            .map_err(|e| RouterError::backend(BackendRole::Secondary, e))?;
        rows.extend(secondary_rows);
    }

    if !decision.read_primary && !decision.read_secondary {
        // Degraded but non-fatal: mid-migration policies may blank a
        // direction on purpose.
        router.record(RouterEvent::EmptyRoute);
        debug!(op = kind.as_str(), table = table.as_str(), "read routed to no backend");
    }

    Ok(Response::new(rows))
}

pub(crate) async fn execute_write(parts: ExecutionParts<'_>) -> Result<WriteReport, RouterError> {
    let ExecutionParts {
        router,
        kind,
        table,
        primary,
        secondary,
        identity,
    } = parts;

    let decision = resolve(router, &identity).await?;
    debug!(
        op = kind.as_str(),
        table = table.as_str(),
        identity = %identity,
        decision = %decision,
        "routing write"
    );

    if decision.write_primary {
        router.record(RouterEvent::WriteRouted {
            target: BackendRole::Primary,
        });
    }
    if decision.write_secondary {
        router.record(RouterEvent::WriteRouted {
            target: BackendRole::Secondary,
        });
    }

    match (decision.write_primary, decision.write_secondary) {
        // Fan-out/fan-in: both dispatched concurrently, resolution waits for
        // the slower side. No lock or transaction spans the two backends.
        (true, true) => {
            let (primary_result, secondary_result) =
                futures::join!(primary.execute(), secondary.execute());

            match (primary_result, secondary_result) {
                (Ok(primary_rows), Ok(secondary_rows)) => Ok(WriteReport::new(vec![
                    WriteOutcome::new(BackendRole::Primary, primary_rows),
                    WriteOutcome::new(BackendRole::Secondary, secondary_rows),
                ])),
                (Ok(_), Err(source)) => {
                    router.record(RouterEvent::PartialWrite);
                    warn!(
                        op = kind.as_str(),
                        table = table.as_str(),
                        "partial write: primary committed, secondary failed"
                    );
                    Err(RouterError::PartialWrite {
                        succeeded: BackendRole::Primary,
                        failed: BackendRole::Secondary,
                        source,
                    })
                }
                (Err(source), Ok(_)) => {
                    router.record(RouterEvent::PartialWrite);
                    warn!(
                        op = kind.as_str(),
                        table = table.as_str(),
                        "partial write: secondary committed, primary failed"
                    );
                    Err(RouterError::PartialWrite {
                        succeeded: BackendRole::Secondary,
                        failed: BackendRole::Primary,
                        source,
                    })
                }
                // Both failed: no divergence, report the primary's error.
                (Err(source), Err(_)) => Err(RouterError::backend(BackendRole::Primary, source)),
            }
        }

        (true, false) => {
            let rows = primary
                .execute()
                .await
                .map_err(|e| RouterError::backend(BackendRole::Primary, e))?;
            Ok(WriteReport::new(vec![WriteOutcome::new(
                BackendRole::Primary,
                rows,
            )]))
        }

        (false, true) => {
            let rows = secondary
                .execute()
                .await
                .map_err(|e| RouterError::backend(BackendRole::Secondary, e))?;
            Ok(WriteReport::new(vec![WriteOutcome::new(
                BackendRole::Secondary,
                rows,
            )]))
        }

        (false, false) => {
            router.record(RouterEvent::EmptyRoute);
            debug!(op = kind.as_str(), table = table.as_str(), "write routed to no backend");
            Ok(WriteReport::empty())
        }
    }
}

/// Evaluate the routing decision. At most one policy call per trigger; a
/// failure here is fail-closed and no backend sees the operation.
async fn resolve(
    router: &Router,
    identity: &IdentityContext,
) -> Result<RoutingDecision, RouterError> {
    match router.policy().evaluate(identity).await {
        Ok(decision) => Ok(decision),
        Err(err) => {
            router.record(RouterEvent::PolicyFailure);
            warn!(identity = %identity, "policy evaluation failed: {err}");
            Err(RouterError::Policy(err))
        }
    }
}
