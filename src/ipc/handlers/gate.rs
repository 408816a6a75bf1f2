use crate::app::Action;
use crate::ipc::helpers::{self, dispatch_action};
use crate::ipc::types::{AppState, Request};

/// `gate.login` takes the PIN in one call: it is entered, then submitted.
fn handle_gate_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let pin = match helpers::required_str(req, "pin") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let entered = dispatch_action(state, req, Action::EnterPin(pin));
    if entered.get("ok").and_then(|v| v.as_bool()) != Some(true) {
        return entered;
    }
    dispatch_action(state, req, Action::SubmitPin)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "gate.open" => Some(dispatch_action(state, req, Action::OpenLogin)),
        "gate.login" => Some(handle_gate_login(state, req)),
        "gate.logout" => Some(dispatch_action(state, req, Action::Logout)),
        _ => None,
    }
}
