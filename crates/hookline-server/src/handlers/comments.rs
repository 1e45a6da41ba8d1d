//! `POST /comments`: note events on merge requests and commits.

use axum::{body::Bytes, extract::State, http::StatusCode};
use hookline_core::decision::decide_comment;

use crate::{AppState, auth::Authenticated, error::Error, handlers};

pub async fn handler(
  _auth: Authenticated,
  State(state): State<AppState>,
  body: Bytes,
) -> Result<StatusCode, Error> {
  let event = handlers::decode(&body)?;
  let decision = decide_comment(&event, state.directory.snapshot().as_ref(), &state.recipients)?;
  handlers::hand_off(&state, decision);
  Ok(StatusCode::OK)
}
