use tracing::{info, warn};

use crate::{
    context::RunContext,
    executor::{Call, RequestExecutor},
    tracker::{CLEANUP_ORDER, ResourceRecord},
    transport::Transport,
};

/// Delete everything the run created, dependents first. Each id gets exactly one DELETE;
/// ids whose delete fails stay tracked and are returned as orphans.
pub fn drain<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> Vec<ResourceRecord> {
    info!("cleaning up test resources");
    let mut orphans = Vec::new();
    for kind in CLEANUP_ORDER {
        let ids = ctx.tracker.ids(kind).to_vec();
        for id in ids {
            let call = Call::delete(format!("Delete {kind} {id}"), kind.item_path(&id));
            if exec.execute(ctx, call).success {
                ctx.tracker.forget(kind, &id);
            } else {
                warn!(kind = %kind, id = %id, "cleanup failed; resource left behind");
                orphans.push(ResourceRecord { kind, id });
            }
        }
    }
    orphans
}
