//! Game WebSocket wrapper
//!
//! Browser callbacks are funneled into a single `LinkEvent` handler so the
//! session sees open, message, close and error in one ordered stream.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::error::ClientError;
use crate::protocol::ClientMessage;

/// Out-of-band and in-band channel events
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Open,
    Message(String),
    Closed(String),
    Error(String),
}

pub struct GameSocket {
    ws: WebSocket,
}

impl GameSocket {
    /// Open `url` and route every event to `on_event`
    pub fn connect<F>(url: &str, on_event: F) -> Result<Self, ClientError>
    where
        F: FnMut(LinkEvent) + 'static,
    {
        let ws = WebSocket::new(url)
            .map_err(|e| ClientError::Transport(ClientError::from(e).to_string()))?;
        let handler = Rc::new(RefCell::new(on_event));

        {
            let handler = handler.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                (handler.borrow_mut())(LinkEvent::Open);
            });
            ws.set_onopen(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            let handler = handler.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MessageEvent| {
                match event.data().as_string() {
                    Some(text) => (handler.borrow_mut())(LinkEvent::Message(text)),
                    None => log::warn!("Ignoring non-text WebSocket frame"),
                }
            });
            ws.set_onmessage(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            let handler = handler.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: CloseEvent| {
                let reason = format!("code {} {}", event.code(), event.reason());
                (handler.borrow_mut())(LinkEvent::Closed(reason));
            });
            ws.set_onclose(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                (handler.borrow_mut())(LinkEvent::Error("WebSocket error".into()));
            });
            ws.set_onerror(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        log::info!("Connecting to {}", url);
        Ok(Self { ws })
    }

    pub fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    /// Fire-and-forget send
    pub fn send(&self, msg: &ClientMessage) -> Result<(), ClientError> {
        if !self.is_open() {
            return Err(ClientError::Transport("socket is not open".into()));
        }
        let json = msg.to_json()?;
        self.ws
            .send_with_str(&json)
            .map_err(|e| ClientError::Transport(ClientError::from(e).to_string()))
    }

    pub fn close(&self) {
        let _ = self.ws.close();
    }
}
