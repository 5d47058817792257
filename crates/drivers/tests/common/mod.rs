use std::io::{BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use tpcc_drivers::wire;

/// Stand-in for the target server.
///
/// Accepts a single connection and answers each request frame with the
/// next reply produced by `respond`. Returning `None` hangs up. The handle
/// yields every statement received, probe included.
pub fn stub_server<F>(mut respond: F) -> (u16, JoinHandle<Vec<String>>)
where
    F: FnMut(&str) -> Option<String> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut seen = Vec::new();
        while let Some(frame) = wire::read_frame(&mut stream).unwrap() {
            let sql = wire::frame_text(&frame);
            let reply = respond(&sql);
            seen.push(sql);
            match reply {
                Some(reply) => send(&mut stream, &reply),
                None => break,
            }
        }
        seen
    });
    (port, handle)
}

fn send(stream: &mut TcpStream, reply: &str) {
    let mut writer = BufWriter::new(stream);
    writer.write_all(reply.as_bytes()).unwrap();
    writer.write_all(&[wire::TERMINATOR]).unwrap();
    writer.flush().unwrap();
}
