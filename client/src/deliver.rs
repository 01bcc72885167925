//! The delivery stream consumer.
//!
//! One connection, one seek, then blocks until the service closes the
//! stream or sends a terminal status.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use pontoon_messages::{frame, DeliverResponse, SeekInfo};
use pontoon_msp::LocalSigner;
use pontoon_types::{ChannelHeader, Envelope, Header, HeaderType, Payload};

use crate::error::ClientError;
use crate::verify::BlockVerifier;

/// A delivery session with the ordering service.
pub struct DeliverClient {
    conn: TcpStream,
    channel_id: String,
    signer: LocalSigner,
    quiet: bool,
    blocks_received: u64,
}

impl DeliverClient {
    /// Connect to the delivery endpoint.
    pub async fn connect(
        server: &str,
        channel_id: &str,
        signer: LocalSigner,
        quiet: bool,
    ) -> Result<Self, ClientError> {
        let conn = TcpStream::connect(server).await?;
        tracing::debug!(server, channel = %channel_id, "connected to delivery endpoint");
        Ok(Self {
            conn,
            channel_id: channel_id.to_string(),
            signer,
            quiet,
            blocks_received: 0,
        })
    }

    /// Blocks received so far in this session.
    pub fn blocks_received(&self) -> u64 {
        self.blocks_received
    }

    /// Seek from the oldest retained block and keep at it indefinitely.
    pub async fn seek_oldest(&mut self) -> Result<(), ClientError> {
        self.send_seek(SeekInfo::oldest()).await
    }

    /// Seek from the newest block and keep at it indefinitely.
    pub async fn seek_newest(&mut self) -> Result<(), ClientError> {
        self.send_seek(SeekInfo::newest()).await
    }

    /// Fetch exactly block `number`.
    pub async fn seek_single(&mut self, number: u64) -> Result<(), ClientError> {
        self.send_seek(SeekInfo::single(number)).await
    }

    async fn send_seek(&mut self, info: SeekInfo) -> Result<(), ClientError> {
        let envelope = self.seek_envelope(info);
        frame::write_bytes(&mut self.conn, &envelope.to_bytes()).await?;
        self.conn.flush().await?;
        Ok(())
    }

    /// Wrap a seek in a signed envelope addressed to this channel.
    fn seek_envelope(&self, info: SeekInfo) -> Envelope {
        let channel_header = ChannelHeader {
            header_type: HeaderType::DeliverSeekInfo,
            channel_id: self.channel_id.clone(),
            tx_id: String::new(),
            epoch: 0,
        };
        let payload = Payload {
            header: Some(Header {
                channel_header: channel_header.to_bytes(),
                signature_header: self.signer.new_signature_header().to_bytes(),
            }),
            data: info.to_bytes(),
        };
        let payload_bytes = payload.to_bytes();
        let signature = self.signer.sign(&payload_bytes);
        Envelope {
            payload: payload_bytes,
            signature,
        }
    }

    /// Read responses until the stream closes or a status arrives.
    ///
    /// Every block increments the session counter and is printed (full
    /// contents, or just the height in quiet mode). With a verifier,
    /// blocks above height 0 get their signature sets checked.
    pub async fn read_until_close(&mut self, verifier: Option<&BlockVerifier>) {
        loop {
            let bytes = match frame::read_bytes(&mut self.conn).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "error receiving from delivery stream");
                    return;
                }
            };
            let response = match DeliverResponse::from_bytes(&bytes) {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "malformed delivery response");
                    return;
                }
            };

            match response {
                DeliverResponse::Status(status) => {
                    println!("Got status: {status:?}");
                    return;
                }
                DeliverResponse::Block(block) => {
                    self.blocks_received += 1;
                    if self.quiet {
                        println!("Received block: {}", block.header.number);
                    } else {
                        println!("Received block:");
                        match serde_json::to_string_pretty(&block) {
                            Ok(json) => println!("{json}"),
                            Err(e) => eprintln!("  error pretty printing block: {e}"),
                        }
                    }

                    if let Some(verifier) = verifier {
                        if block.header.number > 0 {
                            verifier.verify_block(&block);
                            println!("Blocks received: {}", self.blocks_received);
                        }
                    }
                }
            }
        }
    }
}
