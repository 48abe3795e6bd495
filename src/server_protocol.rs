use serde_json::{json, Value};

use crate::config::RoundConfig;
use crate::types::{Direction, GridView, Snapshot};

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Input { dir: Direction },
    Begin,
    Restart,
    Ping { t: f64 },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Input { dir })
        }
        "begin" => Some(ParsedClientMessage::Begin),
        "restart" => Some(ParsedClientMessage::Restart),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

pub fn welcome_message(config: &RoundConfig, grid: &GridView) -> Value {
    json!({
        "type": "welcome",
        "config": config,
        "grid": grid,
    })
}

pub fn state_message(snapshot: &Snapshot) -> Value {
    json!({
        "type": "state",
        "snapshot": snapshot,
    })
}

pub fn pong_message(t: f64) -> Value {
    json!({
        "type": "pong",
        "t": t,
    })
}

pub fn error_message(message: &str) -> Value {
    json!({
        "type": "error",
        "message": message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Grid;

    #[test]
    fn parse_input_message() {
        let parsed = parse_client_message(r#"{"type":"input","dir":"up"}"#);
        assert_eq!(
            parsed,
            Some(ParsedClientMessage::Input { dir: Direction::Up })
        );
    }

    #[test]
    fn parse_input_rejects_invalid_or_missing_direction() {
        assert!(parse_client_message(r#"{"type":"input","dir":"invalid"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"input","dir":"none"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"input"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"input","dir":3}"#).is_none());
    }

    #[test]
    fn parse_round_control_messages() {
        assert_eq!(
            parse_client_message(r#"{"type":"begin"}"#),
            Some(ParsedClientMessage::Begin)
        );
        assert_eq!(
            parse_client_message(r#"{"type":"restart","extra":1}"#),
            Some(ParsedClientMessage::Restart)
        );
    }

    #[test]
    fn parse_ping_requires_finite_number() {
        let parsed = parse_client_message(r#"{"type":"ping","t":12.5}"#);
        assert_eq!(parsed, Some(ParsedClientMessage::Ping { t: 12.5 }));
        assert!(parse_client_message(r#"{"type":"ping","t":"soon"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"ping"}"#).is_none());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_client_message("not json").is_none());
        assert!(parse_client_message("[]").is_none());
        assert!(parse_client_message(r#"{"kind":"begin"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"lobby_start"}"#).is_none());
    }

    #[test]
    fn welcome_carries_config_and_layout() {
        let grid = Grid::new().to_view();
        let message = welcome_message(&RoundConfig::default(), &grid);
        assert_eq!(message["type"], "welcome");
        assert_eq!(message["config"]["startingLives"], 3);
        assert_eq!(message["grid"]["width"], 19);
        assert_eq!(message["grid"]["cells"].as_array().map(Vec::len), Some(21));
    }

    #[test]
    fn pong_and_error_shapes() {
        assert_eq!(pong_message(4.0), json!({"type": "pong", "t": 4.0}));
        assert_eq!(error_message("invalid message")["type"], "error");
    }
}
