//! Academic writing: prompt construction and the composer seam.

use async_trait::async_trait;

use super::menu::WritingKind;
use crate::providers::ProviderError;

/// Produces long-form content from a single system prompt.
#[async_trait]
pub trait Composer: Send + Sync {
    async fn compose(&self, prompt: &str) -> Result<String, ProviderError>;
}

pub fn academic_prompt(topic: &str, kind: WritingKind) -> String {
    format!(
        "أنت خبير أكاديمي متخصص في {label}.
المطلوب: إنتاج محتوى أكاديمي عالي الجودة حول الموضوع التالي:
\"{topic}\"

المتطلبات:
1. مقدمة متقنة مع خلفية نظرية
2. إطار نظري متكامل
3. منهجية واضحة
4. تحليل عميق
5. خاتمة مع توصيات
6. قائمة مراجع معتمدة",
        label = kind.label(),
    )
}

pub fn document_caption(kind: WritingKind) -> String {
    format!("📄 {} كملف Word", kind.label())
}

pub fn document_file_name(kind: WritingKind) -> String {
    format!("{}.docx", kind.file_stem())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_type_and_topic() {
        let prompt = academic_prompt("الذكاء الاصطناعي في التعليم", WritingKind::MastersThesis);
        assert!(prompt.starts_with("أنت خبير أكاديمي متخصص في رسالة ماجستير."));
        assert!(prompt.contains("\"الذكاء الاصطناعي في التعليم\""));
        assert!(prompt.contains("6. قائمة مراجع معتمدة"));
    }

    #[test]
    fn test_document_naming() {
        assert_eq!(document_caption(WritingKind::ReligiousBook), "📄 كتاب ديني كملف Word");
        assert_eq!(document_file_name(WritingKind::PhdThesis), "phd_thesis.docx");
    }
}
