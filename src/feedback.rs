//! 反馈收集通道：校验、入队、按序尝试通知渠道并优雅降级。

use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::ai::AiDifficulty;

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// 玩家提交的反馈内容。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackSubmission {
    /// 1–5 星评分。
    pub rating: u8,
    pub difficulty: AiDifficulty,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub suggestions: String,
}

/// Which provider in the ordered chain actually delivered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Primary,
    Secondary,
    Tertiary,
    None,
}

impl DeliveryMethod {
    fn from_position(position: usize) -> Self {
        match position {
            0 => DeliveryMethod::Primary,
            1 => DeliveryMethod::Secondary,
            _ => DeliveryMethod::Tertiary,
        }
    }
}

/// 提交回执：accepted 只取决于是否入队，与投递结果无关。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackReceipt {
    pub accepted: bool,
    pub delivery: DeliveryMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum FeedbackError {
    RatingOutOfRange { rating: u8 },
}

#[derive(Debug, Clone)]
pub struct DeliveryError {
    pub provider: &'static str,
    pub reason: String,
}

/// 单个出站通知渠道。
pub trait NotificationProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn deliver(&self, submission: &FeedbackSubmission) -> Result<(), DeliveryError>;
}

/// Logs the payload to the browser console; outside wasm it accepts
/// silently so host-side tests never touch JS APIs.
pub struct ConsoleProvider;

impl NotificationProvider for ConsoleProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    #[cfg(target_arch = "wasm32")]
    fn deliver(&self, submission: &FeedbackSubmission) -> Result<(), DeliveryError> {
        let line = serde_json::to_string(submission).map_err(|error| DeliveryError {
            provider: self.name(),
            reason: error.to_string(),
        })?;
        web_sys::console::log_1(&format!("feedback: {line}").into());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn deliver(&self, _submission: &FeedbackSubmission) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// 按序尝试各通知渠道，第一个成功即停。
///
/// The journal is the durable queue: once a submission lands there the
/// receipt says `accepted`, whatever the providers do afterwards.
pub struct FeedbackPipeline {
    providers: Vec<Box<dyn NotificationProvider>>,
    journal: Mutex<Vec<FeedbackSubmission>>,
}

impl FeedbackPipeline {
    pub fn new(providers: Vec<Box<dyn NotificationProvider>>) -> Self {
        Self {
            providers,
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn submit(&self, submission: FeedbackSubmission) -> Result<FeedbackReceipt, FeedbackError> {
        if !(MIN_RATING..=MAX_RATING).contains(&submission.rating) {
            return Err(FeedbackError::RatingOutOfRange {
                rating: submission.rating,
            });
        }

        self.journal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(submission.clone());

        let mut delivery = DeliveryMethod::None;
        for (position, provider) in self.providers.iter().enumerate() {
            if provider.deliver(&submission).is_ok() {
                delivery = DeliveryMethod::from_position(position);
                break;
            }
        }

        Ok(FeedbackReceipt {
            accepted: true,
            delivery,
        })
    }

    pub fn journal_len(&self) -> usize {
        self.journal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// 默认管线：浏览器控制台作为唯一渠道。
pub fn default_pipeline() -> &'static FeedbackPipeline {
    static PIPELINE: Lazy<FeedbackPipeline> =
        Lazy::new(|| FeedbackPipeline::new(vec![Box::new(ConsoleProvider)]));
    &PIPELINE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubProvider {
        name: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl NotificationProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn deliver(&self, _submission: &FeedbackSubmission) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(DeliveryError {
                    provider: self.name,
                    reason: "unreachable".into(),
                })
            }
        }
    }

    fn provider(name: &'static str, succeed: bool) -> (Box<dyn NotificationProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(StubProvider {
                name,
                succeed,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    fn submission(rating: u8) -> FeedbackSubmission {
        FeedbackSubmission {
            rating,
            difficulty: AiDifficulty::Hard,
            message: "fun game".into(),
            suggestions: "sound effects".into(),
        }
    }

    #[test]
    fn first_successful_provider_wins() {
        let (primary, primary_calls) = provider("smtp", true);
        let (secondary, secondary_calls) = provider("webhook", true);
        let pipeline = FeedbackPipeline::new(vec![primary, secondary]);

        let receipt = pipeline.submit(submission(5)).expect("rating is valid");
        assert_eq!(receipt.delivery, DeliveryMethod::Primary);
        assert!(receipt.accepted);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            secondary_calls.load(Ordering::SeqCst),
            0,
            "chain must stop at the first success"
        );
    }

    #[test]
    fn fallback_walks_the_chain_in_order() {
        let (primary, _) = provider("smtp", false);
        let (secondary, _) = provider("webhook", false);
        let (tertiary, tertiary_calls) = provider("console", true);
        let pipeline = FeedbackPipeline::new(vec![primary, secondary, tertiary]);

        let receipt = pipeline.submit(submission(3)).expect("rating is valid");
        assert_eq!(receipt.delivery, DeliveryMethod::Tertiary);
        assert_eq!(tertiary_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn total_delivery_failure_still_accepts() {
        let (primary, _) = provider("smtp", false);
        let pipeline = FeedbackPipeline::new(vec![primary]);

        let receipt = pipeline.submit(submission(1)).expect("rating is valid");
        assert!(receipt.accepted, "journaled feedback is accepted");
        assert_eq!(receipt.delivery, DeliveryMethod::None);
        assert_eq!(pipeline.journal_len(), 1);
    }

    #[test]
    fn out_of_range_rating_is_rejected_before_journaling() {
        let (primary, calls) = provider("smtp", true);
        let pipeline = FeedbackPipeline::new(vec![primary]);

        for rating in [0u8, 6, 200] {
            let result = pipeline.submit(submission(rating));
            assert_eq!(result, Err(FeedbackError::RatingOutOfRange { rating }));
        }
        assert_eq!(pipeline.journal_len(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
