//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a tokio-tungstenite client.

#[cfg(feature = "websocket")]
mod websocket {
    use craftroom_transport::{
        Connection, Frame, FrameSink, FrameSource, Transport, WebSocketConnection,
        WebSocketTransport,
    };
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type Client = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds a transport, connects one client and returns both ends.
    async fn pair() -> (WebSocketConnection, Client) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_text_frames_flow_both_ways() {
        let (conn, mut client) = pair().await;
        assert!(conn.id().into_inner() > 0);
        let (mut sink, mut source) = conn.split();

        sink.send(Frame::Text(r#"{"event":"ping"}"#.into()))
            .await
            .expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"event":"ping"}"#);

        client
            .send(Message::Text(r#"{"event":"request-map"}"#.into()))
            .await
            .unwrap();
        let received = source
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"event":"request-map"}"#);

        sink.close().await;
    }

    #[tokio::test]
    async fn test_binary_frames_accepted() {
        let (conn, mut client) = pair().await;
        let (_sink, mut source) = conn.split();

        client
            .send(Message::Binary(b"raw".to_vec().into()))
            .await
            .unwrap();
        assert_eq!(source.recv().await.unwrap(), Some(b"raw".to_vec()));
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        let (conn, mut client) = pair().await;
        let (_sink, mut source) = conn.split();

        client.send(Message::Close(None)).await.unwrap();

        let result = source.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_client_ping_counts_as_activity() {
        let (conn, mut client) = pair().await;
        let (_sink, mut source) = conn.split();
        let before = source.last_activity();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        client.send(Message::Ping(b"hi".to_vec().into())).await.unwrap();

        // The ping is consumed, not handed up as data.
        let pending =
            tokio::time::timeout(std::time::Duration::from_millis(200), source.recv()).await;
        assert!(pending.is_err(), "control frames are not data");
        assert!(source.last_activity() > before);
    }

    #[tokio::test]
    async fn test_ping_frame_reaches_client() {
        let (conn, mut client) = pair().await;
        let (mut sink, _source) = conn.split();

        sink.send(Frame::Ping).await.expect("ping should send");
        let msg = client.next().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Ping(_)), "{msg:?}");
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (a, _ca) = pair().await;
        let (b, _cb) = pair().await;
        assert_ne!(a.id(), b.id());
    }
}
