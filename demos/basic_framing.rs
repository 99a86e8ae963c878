use pppos::accm::Accm;
use pppos::decode::ReceiveState;
use pppos::encode::encode_frame;
use std::fs::File;
use std::io::Read;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <payload_file>", args[0]);
        return Ok(());
    }

    let mut file = File::open(&args[1])?;
    let mut payload = Vec::new();
    file.read_to_end(&mut payload)?;

    let accm = Accm::default_escaping();
    let protocol = 0x0021; // PPP_IP
    let chain = encode_frame(&payload, protocol, false, false, true, &accm)?;
    let wire = chain.into_bytes();

    print!("Wire bytes ({} total):", wire.len());
    for b in &wire {
        print!(" {b:02x}");
    }
    println!();

    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &accm);

    println!("\nDecoded frames:");
    for event in events {
        match event {
            pppos::decode::FrameEvent::Dispatched { protocol, payload } => {
                println!("  protocol 0x{protocol:04x}, {} payload byte(s)", payload.len());
            }
            other => println!("  dropped: {other:?}"),
        }
    }

    Ok(())
}
