use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use chrono::{DateTime, Utc};
use futures::{sink::SinkExt, stream::StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::api::auth::AuthSession;
use crate::api::models::{ClientMessage, WebSocketMessage};
use crate::countdown::{format_countdown, CountdownSlot, TimeRemaining};
use crate::domain::Session;
use crate::finance::format_time;
use crate::server::ServerState;

/// 클라이언트 명령 버퍼 크기
const COMMAND_BUFFER: usize = 16;

/// WebSocket 연결 핸들러
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
    AuthSession(session): AuthSession,
) -> Response {
    ws.on_upgrade(|socket| websocket_connection(socket, state, session))
}

/// WebSocket 연결 처리
///
/// 세션 사용자의 변경 이벤트와 시스템 시계 틱을 클라이언트로 보냅니다.
/// 클라이언트가 `WatchDeposit` 을 보내면 그 만료 시각까지의 카운트다운 틱도 보냅니다.
async fn websocket_connection(socket: WebSocket, state: ServerState, session: Session) {
    let user_id = session.user_id().to_string();
    let (mut sender, mut receiver) = socket.split();

    let mut subscription = match state.backend.subscribe(&user_id).await {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!("⚠️ 실시간 구독 실패: user={} error={}", user_id, e);
            let message = WebSocketMessage::Error { message: e.to_string() };
            if let Ok(json) = serde_json::to_string(&message) {
                let _ = sender.send(Message::Text(json)).await;
            }
            return;
        }
    };
    let mut clock_rx = state.live_clock.subscribe();
    let clock = state.clock.clone();
    let (command_tx, mut command_rx) = mpsc::channel::<ClientMessage>(COMMAND_BUFFER);
    info!("🔌 WebSocket 연결: user={}", user_id);

    // 클라이언트로부터 메시지 수신 처리
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match parse_command(&text) {
                    Some(command) => {
                        if command_tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    None => debug!("알 수 없는 메시지: {}", text),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // 구독 이벤트/시계 틱/입금 카운트다운을 클라이언트로 전송
    let mut send_task = tokio::spawn(async move {
        let mut deposit = CountdownSlot::new();
        loop {
            let message = tokio::select! {
                event = subscription.next() => match event {
                    Some(event) => WebSocketMessage::Event { event },
                    None => break,
                },
                changed = clock_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let system_time = *clock_rx.borrow_and_update();
                    WebSocketMessage::Clock {
                        system_time,
                        display: format_time(system_time).unwrap_or_default(),
                    }
                }
                command = command_rx.recv() => match command {
                    Some(ClientMessage::WatchDeposit { expires_at }) => {
                        debug!("⏱️ 입금 카운트다운 구독: 만료={}", expires_at);
                        let remaining = deposit.watch(expires_at, clock.clone());
                        countdown_message(expires_at, remaining)
                    }
                    Some(ClientMessage::UnwatchDeposit) => {
                        deposit.clear();
                        continue;
                    }
                    None => break,
                },
                remaining = deposit.changed() => match (remaining, deposit.target()) {
                    (Some(remaining), Some(expires_at)) => countdown_message(expires_at, remaining),
                    _ => {
                        deposit.clear();
                        continue;
                    }
                },
            };

            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    warn!("⚠️ 메시지 직렬화 실패: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // 두 태스크 중 하나라도 완료되면 연결 종료 (구독은 send_task 와 함께 해제)
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    info!("🔌 WebSocket 종료: user={}", user_id);
}

fn parse_command(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}

fn countdown_message(expires_at: DateTime<Utc>, remaining: TimeRemaining) -> WebSocketMessage {
    WebSocketMessage::Countdown {
        expires_at,
        remaining,
        display: format_countdown(&remaining),
    }
}
