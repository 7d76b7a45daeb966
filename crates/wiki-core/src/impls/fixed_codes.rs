//! FixedCodes - 決められた順に code を返す CodeGenerator
//!
//! 衝突を意図的に起こすためのもの。使い切ったら末尾の code を返し続ける。

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::domain::errors::WikiError;
use crate::ports::CodeGenerator;

#[derive(Debug)]
pub struct FixedCodes {
    queue: Mutex<(VecDeque<String>, Option<String>)>,
}

impl FixedCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = codes.into_iter().map(Into::into).collect();
        Self {
            queue: Mutex::new((queue, None)),
        }
    }
}

impl CodeGenerator for FixedCodes {
    fn generate(&self) -> Result<String, WikiError> {
        let mut guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let (queue, last) = &mut *guard;
        if let Some(code) = queue.pop_front() {
            *last = Some(code.clone());
            return Ok(code);
        }
        last.clone()
            .ok_or_else(|| WikiError::RandomSource("no fixed codes configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_come_out_in_order_then_repeat() {
        let codes = FixedCodes::new(["a", "b"]);
        assert_eq!(codes.generate().unwrap(), "a");
        assert_eq!(codes.generate().unwrap(), "b");
        assert_eq!(codes.generate().unwrap(), "b");
    }

    #[test]
    fn empty_generator_fails() {
        let codes = FixedCodes::new(Vec::<String>::new());
        assert!(matches!(codes.generate(), Err(WikiError::RandomSource(_))));
    }
}
