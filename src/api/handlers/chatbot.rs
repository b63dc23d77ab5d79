use axum::{extract::State, Json};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::debug;
use uuid::Uuid;

use crate::ai::{prompts, snapshot, ChatOptions};
use crate::api::handlers::AppState;
use crate::api::models::*;
use crate::auth::AuthUser;
use crate::db::{
    self,
    models::{NewCategory, NewTransaction, UpdateCategory, UpdateTransaction},
};
use crate::error::Result;

/// How many recent transactions the planner sees for reference resolution
const RECENT_CONTEXT_SIZE: i64 = 30;

/// POST /api/v1/chatbot/ask - Answer a question about the user's finances
pub async fn ask(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChatbotRequest>,
) -> Result<Json<ChatbotResponse>> {
    let ai = state.ai_client()?;

    let snapshot = snapshot::build_snapshot(&state.pool, &user).await?;

    let response = ai
        .chat(
            prompts::ASSISTANT_SYSTEM_PROMPT,
            &prompts::assistant_user_prompt(&request.query, &snapshot),
            &ChatOptions::default(),
        )
        .await?;

    Ok(Json(ChatbotResponse { response }))
}

/// POST /api/v1/chatbot/command - Plan actions from a natural-language
/// command via the LLM, then execute them against the user's data.
pub async fn command(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChatCommandRequest>,
) -> Result<Json<ChatCommandResponse>> {
    let ai = state.ai_client()?;
    let now = Utc::now();

    let recent =
        db::transactions::list_recent_transactions(&state.pool, user.id, RECENT_CONTEXT_SIZE)
            .await?;
    let categories = db::categories::list_categories(&state.pool, user.id).await?;

    let category_names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
    let recent_context: Vec<Value> = recent
        .iter()
        .map(|tx| {
            let category_name = tx.category_id.and_then(|id| {
                categories
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.name.clone())
            });
            json!({
                "id": tx.id,
                "description": tx.description,
                "amount": tx.amount,
                "category_name": category_name,
                "transaction_date": tx.transaction_date.to_rfc3339(),
            })
        })
        .collect();

    let plan_text = ai
        .chat(
            prompts::PLANNER_SYSTEM_PROMPT,
            &prompts::planner_user_prompt(
                &request.command,
                now,
                &Value::Array(recent_context),
                &category_names,
            ),
            &ChatOptions {
                temperature: 0.0,
                max_tokens: 512,
                json_response: true,
            },
        )
        .await?;

    let actions = parse_plan(&plan_text);
    debug!("Planner produced {} action(s)", actions.len());

    let plan = ChatCommandPlan { actions };

    let executed = if request.dry_run {
        Vec::new()
    } else {
        let mut results = Vec::with_capacity(plan.actions.len());
        for action in &plan.actions {
            results
                .push(execute_action(&state, user.id, action, &request.command, &recent, now).await);
        }
        results
    };

    let response = summarize_execution(&plan, &executed, request.dry_run);

    Ok(Json(ChatCommandResponse {
        plan,
        executed,
        response,
    }))
}

/// Extract the action list from the planner's JSON reply, dropping
/// anything malformed.
fn parse_plan(plan_text: &str) -> Vec<ChatCommandAction> {
    let parsed: Value = match serde_json::from_str(plan_text) {
        Ok(parsed) => parsed,
        Err(_) => return Vec::new(),
    };

    parsed
        .get("actions")
        .and_then(Value::as_array)
        .map(|raw_actions| {
            raw_actions
                .iter()
                .filter_map(|raw| serde_json::from_value(raw.clone()).ok())
                .filter(|action: &ChatCommandAction| !action.kind.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn summarize_execution(
    plan: &ChatCommandPlan,
    executed: &[ExecutedActionResult],
    dry_run: bool,
) -> String {
    if plan.actions.is_empty() {
        return "I couldn't determine any valid action from your command.".to_string();
    }
    if dry_run {
        return "Planned actions without execution (dry run).".to_string();
    }

    let successes = executed.iter().filter(|e| e.status == "success").count();
    let errors = executed.iter().filter(|e| e.status == "error").count();

    match (successes, errors) {
        (s, 0) if s > 0 => "Done.".to_string(),
        (s, e) if s > 0 && e > 0 => "Partially completed.".to_string(),
        _ => "Could not complete the requested action.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Action execution
// ---------------------------------------------------------------------------

fn success(kind: &str, message: &str, data: Value) -> ExecutedActionResult {
    ExecutedActionResult {
        kind: kind.to_string(),
        status: "success".to_string(),
        message: message.to_string(),
        data: Some(data),
    }
}

fn failure(kind: &str, message: &str) -> ExecutedActionResult {
    ExecutedActionResult {
        kind: kind.to_string(),
        status: "error".to_string(),
        message: message.to_string(),
        data: None,
    }
}

/// Amounts can arrive as numbers or as strings with currency decoration
fn clean_amount(raw: Option<&Value>) -> Option<f64> {
    static AMOUNT_RE: OnceLock<Regex> = OnceLock::new();

    match raw? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let re = AMOUNT_RE.get_or_init(|| Regex::new(r"[^0-9.\-]").expect("valid regex"));
            let cleaned = re.replace_all(text, "");
            cleaned.parse().ok()
        }
        _ => None,
    }
}

/// LLMs occasionally return placeholders like "<uuid>" despite instructions
fn is_placeholder(value: &str) -> bool {
    value.starts_with('<')
}

fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Relative dates in the command text beat whatever the planner guessed
fn date_from_relative(command: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lowered = command.to_lowercase();
    if lowered.contains("yesterday") {
        Some(now - Duration::days(1))
    } else if lowered.contains("today") || lowered.contains("now") {
        Some(now)
    } else if lowered.contains("tomorrow") {
        Some(now + Duration::days(1))
    } else {
        None
    }
}

fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Pick the transaction a vague command refers to: explicit id first, then a
/// keyword match against recent descriptions, then simply the latest one.
fn resolve_transaction_id(
    params: &Value,
    command: &str,
    recent: &[db::models::Transaction],
) -> Option<Uuid> {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();

    if let Some(raw) = str_param(params, "id") {
        if !is_placeholder(raw) {
            if let Ok(id) = Uuid::parse_str(raw) {
                return Some(id);
            }
        }
    }

    let re = WORD_RE.get_or_init(|| Regex::new(r"[a-zA-Z]+").expect("valid regex"));
    let lowered = command.to_lowercase();
    let words: Vec<&str> = re
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.len() >= 3)
        .collect();

    for tx in recent {
        let description = tx.description.to_lowercase();
        if words.iter().any(|word| description.contains(word)) {
            return Some(tx.id);
        }
    }

    recent.first().map(|tx| tx.id)
}

/// Look a category up by name, creating it on the fly like the planner expects
async fn ensure_category(state: &AppState, user_id: Uuid, name: &str) -> Result<Uuid> {
    if let Some(existing) = db::categories::get_category_by_name(&state.pool, user_id, name).await? {
        return Ok(existing.id);
    }

    let created = db::categories::create_category(
        &state.pool,
        user_id,
        &NewCategory {
            name: name.to_string(),
            description: None,
            default_percentage: 0.0,
            custom_percentage: None,
            is_default: false,
            is_fixed: false,
        },
    )
    .await?;

    Ok(created.id)
}

async fn execute_action(
    state: &AppState,
    user_id: Uuid,
    action: &ChatCommandAction,
    command: &str,
    recent: &[db::models::Transaction],
    now: DateTime<Utc>,
) -> ExecutedActionResult {
    let kind = action.kind.as_str();
    let params = &action.params;

    let result: Result<ExecutedActionResult> = match kind {
        "create_transaction" => create_transaction(state, user_id, params, command, now).await,
        "update_transaction" => {
            update_transaction(state, user_id, params, command, recent, now).await
        }
        "delete_transaction" => delete_transaction(state, user_id, params, command, recent).await,
        "create_category" => create_category(state, user_id, params).await,
        "update_category" => update_category(state, user_id, params).await,
        "delete_category" => delete_category(state, user_id, params).await,
        _ => Ok(failure(kind, "Unsupported action type")),
    };

    result.unwrap_or_else(|e| failure(kind, &e.log_safe()))
}

async fn create_transaction(
    state: &AppState,
    user_id: Uuid,
    params: &Value,
    command: &str,
    now: DateTime<Utc>,
) -> Result<ExecutedActionResult> {
    const KIND: &str = "create_transaction";

    let Some(description) = str_param(params, "description") else {
        return Ok(failure(KIND, "Missing required param: description"));
    };
    let Some(amount) = clean_amount(params.get("amount")) else {
        return Ok(failure(KIND, "Missing required param: amount"));
    };

    let transaction_date = match date_from_relative(command, now) {
        Some(relative) => relative,
        None => match str_param(params, "transaction_date").and_then(parse_iso_datetime) {
            Some(parsed) => parsed,
            None => return Ok(failure(KIND, "transaction_date must be ISO 8601")),
        },
    };

    let category_id = match str_param(params, "category_name") {
        Some(name) if !name.is_empty() => Some(ensure_category(state, user_id, name).await?),
        _ => None,
    };

    let tx = db::transactions::create_transaction(
        &state.pool,
        user_id,
        &NewTransaction {
            description: description.to_string(),
            amount,
            category_id,
            transaction_date,
        },
    )
    .await?;

    Ok(success(
        KIND,
        "Transaction created",
        json!({"transaction_id": tx.id}),
    ))
}

async fn update_transaction(
    state: &AppState,
    user_id: Uuid,
    params: &Value,
    command: &str,
    recent: &[db::models::Transaction],
    now: DateTime<Utc>,
) -> Result<ExecutedActionResult> {
    const KIND: &str = "update_transaction";

    let Some(transaction_id) = resolve_transaction_id(params, command, recent) else {
        return Ok(failure(KIND, "Unable to resolve transaction id"));
    };

    let transaction_date = match str_param(params, "transaction_date") {
        Some(raw) if is_placeholder(raw) => Some(date_from_relative(command, now).unwrap_or(now)),
        Some(raw) => parse_iso_datetime(raw),
        None => None,
    };

    let category_id = match str_param(params, "category_name") {
        Some(name) if !name.is_empty() => Some(ensure_category(state, user_id, name).await?),
        _ => None,
    };

    let update = UpdateTransaction {
        description: str_param(params, "description").map(str::to_string),
        amount: clean_amount(params.get("amount")),
        category_id,
        transaction_date,
    };

    let tx =
        db::transactions::update_transaction(&state.pool, user_id, transaction_id, &update).await?;

    Ok(success(
        KIND,
        "Transaction updated",
        json!({"transaction_id": tx.id}),
    ))
}

async fn delete_transaction(
    state: &AppState,
    user_id: Uuid,
    params: &Value,
    command: &str,
    recent: &[db::models::Transaction],
) -> Result<ExecutedActionResult> {
    const KIND: &str = "delete_transaction";

    let Some(transaction_id) = resolve_transaction_id(params, command, recent) else {
        return Ok(failure(KIND, "Unable to resolve transaction id"));
    };

    db::transactions::delete_transaction(&state.pool, user_id, transaction_id).await?;

    Ok(success(
        KIND,
        "Transaction deleted",
        json!({"transaction_id": transaction_id}),
    ))
}

async fn create_category(
    state: &AppState,
    user_id: Uuid,
    params: &Value,
) -> Result<ExecutedActionResult> {
    const KIND: &str = "create_category";

    let Some(name) = str_param(params, "name") else {
        return Ok(failure(KIND, "Missing name"));
    };

    if let Some(existing) = db::categories::get_category_by_name(&state.pool, user_id, name).await? {
        return Ok(success(
            KIND,
            "Category already exists",
            json!({"category_id": existing.id}),
        ));
    }

    let category = db::categories::create_category(
        &state.pool,
        user_id,
        &NewCategory {
            name: name.to_string(),
            description: str_param(params, "description").map(str::to_string),
            default_percentage: 0.0,
            custom_percentage: None,
            is_default: false,
            is_fixed: false,
        },
    )
    .await?;

    Ok(success(
        KIND,
        "Category created",
        json!({"category_id": category.id}),
    ))
}

async fn update_category(
    state: &AppState,
    user_id: Uuid,
    params: &Value,
) -> Result<ExecutedActionResult> {
    const KIND: &str = "update_category";

    // by id when the planner produced a real one, by name otherwise
    let category = match str_param(params, "id").filter(|raw| !is_placeholder(raw)) {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => db::categories::get_category(&state.pool, user_id, id).await.ok(),
            Err(_) => None,
        },
        None => None,
    };

    let category = match category {
        Some(category) => Some(category),
        None => match str_param(params, "name") {
            Some(name) => db::categories::get_category_by_name(&state.pool, user_id, name).await?,
            None => None,
        },
    };

    let Some(category) = category else {
        return Ok(failure(KIND, "Category not found"));
    };

    let update = UpdateCategory {
        name: str_param(params, "name").map(str::to_string),
        description: str_param(params, "description").map(str::to_string),
        ..Default::default()
    };

    let updated =
        db::categories::update_category(&state.pool, user_id, category.id, &update).await?;

    Ok(success(
        KIND,
        "Category updated",
        json!({"category_id": updated.id}),
    ))
}

async fn delete_category(
    state: &AppState,
    user_id: Uuid,
    params: &Value,
) -> Result<ExecutedActionResult> {
    const KIND: &str = "delete_category";

    let Some(raw) = str_param(params, "id").filter(|raw| !is_placeholder(raw)) else {
        return Ok(failure(KIND, "Missing id"));
    };
    let Ok(category_id) = Uuid::parse_str(raw) else {
        return Ok(failure(KIND, "Invalid category id"));
    };

    db::categories::delete_category(&state.pool, user_id, category_id).await?;

    Ok(success(
        KIND,
        "Category deleted",
        json!({"category_id": category_id}),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount(Some(&json!(42.5))), Some(42.5));
        assert_eq!(clean_amount(Some(&json!("\u{20b9}1,299.50"))), Some(1299.5));
        assert_eq!(clean_amount(Some(&json!("\u{20b9} 450"))), Some(450.0));
        assert_eq!(clean_amount(Some(&json!("-"))), None);
        assert_eq!(clean_amount(None), None);
        assert_eq!(clean_amount(Some(&json!(null))), None);
    }

    #[test]
    fn test_date_from_relative() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();

        assert_eq!(
            date_from_relative("I spent 100 yesterday", now).unwrap(),
            now - Duration::days(1)
        );
        assert_eq!(date_from_relative("add lunch today", now).unwrap(), now);
        assert!(date_from_relative("on 2nd June", now).is_none());
    }

    #[test]
    fn test_parse_iso_datetime_formats() {
        assert!(parse_iso_datetime("2025-06-18T10:00:00Z").is_some());
        assert!(parse_iso_datetime("2025-06-18T10:00:00").is_some());
        assert!(parse_iso_datetime("2025-06-18").is_some());
        assert!(parse_iso_datetime("18/06/2025").is_none());
    }

    #[test]
    fn test_parse_plan_skips_invalid_actions() {
        let plan = r#"{"actions": [
            {"type": "create_transaction", "params": {"description": "tea", "amount": 20}},
            {"params": {"no": "type field"}},
            "not an object"
        ]}"#;

        let actions = parse_plan(plan);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, "create_transaction");
    }

    #[test]
    fn test_parse_plan_tolerates_garbage() {
        assert!(parse_plan("the model rambled instead of emitting JSON").is_empty());
        assert!(parse_plan("{}").is_empty());
    }
}
