//! The study planner scenarios. Each returns whether its final call passed.

use tracing::{info, warn};

use crate::{
    context::RunContext,
    executor::{Call, RequestExecutor, ResponseBody, id_value},
    payloads,
    session::Credentials,
    tracker::ResourceKind,
    transport::Transport,
};

pub fn registration<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> bool {
    let credentials = Credentials::generate("testuser", &ctx.password);
    let outcome = exec.execute(
        ctx,
        Call::post(
            "User Registration",
            "auth/register",
            payloads::registration(&credentials),
        ),
    );
    if !outcome.success || !store_session(ctx, &outcome.body) {
        return false;
    }
    info!(username = %credentials.username, "registered user");
    true
}

/// Registers a fresh account so the login target is known to exist, then logs in.
pub fn login<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> bool {
    let credentials = Credentials::generate("login_test", &ctx.password);
    exec.execute(
        ctx,
        Call::post(
            "Pre-register for login test",
            "auth/register",
            payloads::registration(&credentials),
        ),
    );

    let outcome = exec.execute(
        ctx,
        Call::post("User Login", "auth/login", payloads::login(&credentials)),
    );
    outcome.success && store_session(ctx, &outcome.body)
}

fn store_session(ctx: &mut RunContext, body: &ResponseBody) -> bool {
    let Some(token) = body.str_at("/access_token").filter(|t| !t.is_empty()) else {
        warn!("auth response did not include an access_token");
        return false;
    };
    let Some(user_id) = body.id_at("/user/id") else {
        warn!("auth response did not include user.id");
        return false;
    };
    ctx.session.authenticate(token, Some(user_id));
    true
}

pub fn subjects_crud<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> bool {
    let kind = ResourceKind::Subject;
    let Some(subject_id) = create_tracked(exec, ctx, kind, "Create Subject", payloads::subject())
    else {
        return false;
    };

    let listed = exec.execute(ctx, Call::get("Get Subjects", kind.collection()));
    if !listed.success {
        return false;
    }
    if !listed.body.is_sequence() {
        warn!("subject listing was not a JSON array");
        return false;
    }
    if !lists_id(&listed.body, &subject_id) {
        warn!(id = %subject_id, "created subject missing from listing");
    }

    exec.execute(
        ctx,
        Call::put(
            "Update Subject",
            kind.item_path(&subject_id),
            payloads::subject_update(),
        ),
    )
    .success
}

pub fn study_sessions_crud<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> bool {
    let kind = ResourceKind::Session;
    let Some(session_id) = create_tracked(
        exec,
        ctx,
        kind,
        "Create Study Session",
        payloads::study_session(),
    ) else {
        return false;
    };

    if !exec
        .execute(ctx, Call::get("Get Study Sessions", kind.collection()))
        .success
    {
        return false;
    }

    exec.execute(
        ctx,
        Call::patch(
            "Complete Study Session",
            format!("{}/complete", kind.item_path(&session_id)),
        ),
    )
    .success
}

pub fn tasks_crud<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> bool {
    let kind = ResourceKind::Task;
    let Some(task_id) = create_tracked(exec, ctx, kind, "Create Task", payloads::task()) else {
        return false;
    };

    if !exec
        .execute(ctx, Call::get("Get Tasks", kind.collection()))
        .success
    {
        return false;
    }

    exec.execute(
        ctx,
        Call::patch(
            "Complete Task",
            format!("{}/complete", kind.item_path(&task_id)),
        )
        .query("completed", "true"),
    )
    .success
}

pub fn goals_crud<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> bool {
    let kind = ResourceKind::Goal;
    if create_tracked(exec, ctx, kind, "Create Goal", payloads::goal()).is_none() {
        return false;
    }
    exec.execute(ctx, Call::get("Get Goals", kind.collection()))
        .success
}

pub fn ai_schedule_generation<T: Transport>(
    exec: &RequestExecutor<T>,
    ctx: &mut RunContext,
) -> bool {
    exec.execute(
        ctx,
        Call::post(
            "AI Schedule Generation",
            "generate-schedule",
            payloads::schedule_request(),
        ),
    )
    .success
}

/// Both endpoints are always called; the scenario needs both to pass.
pub fn analytics_endpoints<T: Transport>(exec: &RequestExecutor<T>, ctx: &mut RunContext) -> bool {
    let dashboard = exec.execute(ctx, Call::get("Dashboard Analytics", "analytics/dashboard"));
    let progress = exec.execute(ctx, Call::get("Progress Analytics", "analytics/progress"));
    dashboard.success && progress.success
}

/// POST to the collection and, if the server answered with an id, track it for cleanup.
fn create_tracked<T: Transport>(
    exec: &RequestExecutor<T>,
    ctx: &mut RunContext,
    kind: ResourceKind,
    name: &str,
    body: serde_json::Value,
) -> Option<String> {
    let outcome = exec.execute(ctx, Call::post(name, kind.collection(), body));
    if !outcome.success {
        return None;
    }
    let Some(id) = outcome.body.id_at("/id") else {
        warn!(call = name, "creation response did not include an id");
        return None;
    };
    ctx.tracker.track(kind, id.clone());
    Some(id)
}

fn lists_id(listing: &ResponseBody, id: &str) -> bool {
    listing
        .items()
        .iter()
        .filter_map(|item| item.get("id").and_then(id_value))
        .any(|listed| listed == id)
}
