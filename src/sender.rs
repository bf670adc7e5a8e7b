//! Outbound message channel for command results and errors

use std::cell::RefCell;

/// Receives text produced while evaluating a command
pub trait Sender {
    fn send_message(&self, message: &str);
}

/// Writes every message to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSender;

impl Sender for ConsoleSender {
    fn send_message(&self, message: &str) {
        println!("{}", message);
    }
}

/// Keeps messages in memory for later inspection
#[derive(Debug, Default)]
pub struct BufferedSender {
    messages: RefCell<Vec<String>>,
}

impl BufferedSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Drain everything received so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl Sender for BufferedSender {
    fn send_message(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_sender_collects_and_drains() {
        let sender = BufferedSender::new();
        sender.send_message("one");
        sender.send_message("two");
        assert_eq!(sender.len(), 2);
        assert_eq!(sender.take(), vec!["one", "two"]);
        assert!(sender.is_empty());
    }
}
