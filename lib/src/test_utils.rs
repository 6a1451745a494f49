use std::net::{Ipv4Addr, TcpListener};

/// Binds a loopback listener; the port stays open while the listener lives
pub fn open_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Returns a loopback port that nothing is listening on
pub fn closed_port() -> u16 {
    let (listener, port) = open_port();
    drop(listener);
    port
}
