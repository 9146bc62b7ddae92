//! WebAssembly bindings for the Harmonies engine.
//!
//! Browser clients use these to highlight legal moves without a round trip.
//! Every argument and result crosses the boundary as JSON in the same shapes
//! the server broadcasts.

use crate::actions::Action;
use crate::animal::{self, ShapeCell};
use crate::board::{self, BoardGrid, BoardType, PlayerBoard};
use crate::game::GameRoom;
use crate::hex::HexCoord;
use crate::token::{Token, TokenColor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {what}: {e}"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn grid_for(board_type: &str) -> Result<BoardGrid, String> {
    let board_type: BoardType =
        serde_json::from_value(serde_json::Value::String(board_type.into()))
            .map_err(|e| format!("Invalid board type: {e}"))?;
    Ok(BoardGrid::for_board(board_type))
}

fn token_placeable_json(color: &str, stack_json: &str) -> Result<bool, String> {
    let color: TokenColor = parse("color", &format!("\"{color}\""))?;
    let stack: Vec<Token> = parse("stack", stack_json)?;
    Ok(board::token_placeable(color, &stack))
}

fn valid_token_spots_json(
    board_json: &str,
    board_type: &str,
    color: &str,
) -> Result<String, String> {
    let board: PlayerBoard = parse("board", board_json)?;
    let color: TokenColor = parse("color", &format!("\"{color}\""))?;
    to_json(&board::valid_token_spots(&board, &grid_for(board_type)?, color))
}

fn can_place_cube_json(
    shape_json: &str,
    board_json: &str,
    board_type: &str,
    anchor_json: &str,
) -> Result<bool, String> {
    let shape: Vec<ShapeCell> = parse("shape", shape_json)?;
    let board: PlayerBoard = parse("board", board_json)?;
    let anchor: HexCoord = parse("hex", anchor_json)?;
    Ok(animal::can_place_cube(&shape, &grid_for(board_type)?, anchor, &board))
}

fn valid_cube_spots_json(
    shape_json: &str,
    board_json: &str,
    board_type: &str,
) -> Result<String, String> {
    let shape: Vec<ShapeCell> = parse("shape", shape_json)?;
    let board: PlayerBoard = parse("board", board_json)?;
    to_json(&animal::valid_cube_spots(&shape, &board, &grid_for(board_type)?))
}

/// Whether a token of `color` may go on `stack` (JSON array, bottom to top)
#[wasm_bindgen(js_name = tokenPlaceable)]
pub fn token_placeable(color: &str, stack_json: &str) -> Result<bool, JsValue> {
    token_placeable_json(color, stack_json).map_err(|e| JsValue::from_str(&e))
}

/// Cells where a `color` token fits, as a JSON array of `{q, r}`
#[wasm_bindgen(js_name = validTokenSpots)]
pub fn valid_token_spots(
    board_json: &str,
    board_type: &str,
    color: &str,
) -> Result<String, JsValue> {
    valid_token_spots_json(board_json, board_type, color).map_err(|e| JsValue::from_str(&e))
}

/// Whether a cube for the card `shape` may go on `anchor`
#[wasm_bindgen(js_name = canPlaceCube)]
pub fn can_place_cube(
    shape_json: &str,
    board_json: &str,
    board_type: &str,
    anchor_json: &str,
) -> Result<bool, JsValue> {
    can_place_cube_json(shape_json, board_json, board_type, anchor_json)
        .map_err(|e| JsValue::from_str(&e))
}

/// Cells where a cube for the card `shape` fits, as a JSON array of `{q, r}`
#[wasm_bindgen(js_name = validCubeSpots)]
pub fn valid_cube_spots(
    shape_json: &str,
    board_json: &str,
    board_type: &str,
) -> Result<String, JsValue> {
    valid_cube_spots_json(shape_json, board_json, board_type).map_err(|e| JsValue::from_str(&e))
}

/// A local room, for hot-seat play without the server
#[wasm_bindgen]
pub struct WasmRoom {
    room: GameRoom,
}

#[wasm_bindgen]
impl WasmRoom {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmRoom {
        WasmRoom {
            room: GameRoom::new(),
        }
    }

    /// Current public state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.room.public_state()).unwrap_or_else(|_| "null".to_string())
    }

    /// Apply an action from JSON, returning the new public state as JSON
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player: &str, action_json: &str) -> Result<String, JsValue> {
        let action: Action = parse("action", action_json).map_err(|e| JsValue::from_str(&e))?;
        let state = self
            .room
            .on_action(player, action)
            .map_err(|e| JsValue::from_str(&format!("Action failed: {e}")))?;
        to_json(&state).map_err(|e| JsValue::from_str(&e))
    }
}

impl Default for WasmRoom {
    fn default() -> Self {
        Self::new()
    }
}
