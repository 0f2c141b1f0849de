use crate::display::describe;
use crate::game::ClientGameState;
use crate::input::{parse_line, Command, HELP};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use shared::{ClientMessage, ServerMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Terminal client: forwards typed commands and prints what the server says
pub struct Client {
    socket: Socket,
    view: ClientGameState,
}

impl Client {
    pub async fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (socket, _) = connect_async(url).await?;
        info!("Connected to {}", url);

        Ok(Client {
            socket,
            view: ClientGameState::new(),
        })
    }

    pub fn view(&self) -> &ClientGameState {
        &self.view
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<(), Box<dyn std::error::Error>> {
        self.socket.send(Message::Text(message.encode()?)).await?;
        Ok(())
    }

    /// Runs until the user quits, stdin closes or the server hangs up
    pub async fn run(&mut self, name: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
        if name.is_some() {
            self.send(&ClientMessage::Join { name }).await?;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("stdin closed");
                        break;
                    };
                    match parse_line(&line) {
                        Ok(Some(Command::Send(message))) => self.send(&message).await?,
                        Ok(Some(Command::Help)) => println!("{}", HELP),
                        Ok(Some(Command::Quit)) => break,
                        Ok(None) => {}
                        Err(e) => println!("{}", e),
                    }
                }
                frame = self.socket.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_text(&text),
                        Some(Ok(Message::Close(_))) | None => {
                            println!("Server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                    }
                }
            }
        }

        let _ = self.socket.close(None).await;
        Ok(())
    }

    fn handle_text(&mut self, text: &str) {
        let message = match ServerMessage::decode(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Ignoring unreadable server message: {}", e);
                return;
            }
        };
        debug!("Received {:?}", message);

        let fresh_logs = self.view.apply(&message);
        for line in describe(&message, &self.view) {
            println!("{}", line);
        }
        for line in fresh_logs {
            println!("  * {}", line);
        }
    }
}
