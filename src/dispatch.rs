// Direct-call-vs-queued-dispatch, expressed as an injected UpperDispatcher
// trait instead of conditional compilation. DirectDispatcher calls straight
// into the upper PPP collaborator; QueueDispatcher marshals the event
// across an mpsc channel to a consumer on the upper-layer thread.

use std::sync::mpsc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCommand {
    Connect,
    Disconnect,
    Free,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    Command(LinkCommand),
    Write { protocol: u16, payload: Vec<u8> },
    NetifOutput(Vec<u8>, u16),
}

pub trait UpperPpp: Send + Sync {
    fn command(&self, link: LinkId, cmd: LinkCommand);
    fn write(&self, link: LinkId, protocol: u16, frame: Vec<u8>);
    fn netif_output(&self, link: LinkId, payload: Vec<u8>, protocol: u16);
}

// Only Send is required, not Sync: a dispatcher is owned by exactly one
// LinkContext, which may move between threads but is never accessed
// concurrently from two, matching input()'s non-reentrancy contract.
pub trait UpperDispatcher: Send {
    fn dispatch(&self, link: LinkId, event: DispatchEvent);
}

fn deliver(upper: &dyn UpperPpp, link: LinkId, event: DispatchEvent) {
    match event {
        DispatchEvent::Command(cmd) => upper.command(link, cmd),
        DispatchEvent::Write { protocol, payload } => upper.write(link, protocol, payload),
        DispatchEvent::NetifOutput(payload, protocol) => upper.netif_output(link, payload, protocol),
    }
}

pub struct DirectDispatcher {
    upper: Arc<dyn UpperPpp>,
}

impl DirectDispatcher {
    pub fn new(upper: Arc<dyn UpperPpp>) -> Self {
        Self { upper }
    }
}

impl UpperDispatcher for DirectDispatcher {
    fn dispatch(&self, link: LinkId, event: DispatchEvent) {
        deliver(self.upper.as_ref(), link, event);
    }
}

#[derive(Clone)]
pub struct QueueDispatcher {
    sender: mpsc::Sender<(LinkId, DispatchEvent)>,
}

impl QueueDispatcher {
    pub fn channel() -> (Self, mpsc::Receiver<(LinkId, DispatchEvent)>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    // Drains receiver and forwards every event to upper until the sender
    // half is dropped. Intended to run on the dedicated upper-layer thread.
    pub fn run(receiver: &mpsc::Receiver<(LinkId, DispatchEvent)>, upper: &dyn UpperPpp) {
        while let Ok((link, event)) = receiver.recv() {
            deliver(upper, link, event);
        }
    }
}

impl UpperDispatcher for QueueDispatcher {
    fn dispatch(&self, link: LinkId, event: DispatchEvent) {
        // Dropped receiver (consumer thread gone) is silently swallowed,
        // same as a completed-but-unread frame would be on destroy.
        let _ = self.sender.send((link, event));
    }
}

pub trait MagicRandomSource: Send {
    fn mix(&self, entropy: u64);
}

#[derive(Debug, Default)]
pub struct NoopRandomSource;

impl MagicRandomSource for NoopRandomSource {
    fn mix(&self, _entropy: u64) {}
}
