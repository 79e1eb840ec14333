//! Button labels, keyboards and static texts.

use super::telegram::Keyboard;

pub const WRITING_SECTION: &str = "📚 قسم التأليف والكتابة";
pub const SECURITY_SECTION: &str = "🔐 قسم الأمن السيبراني";
pub const RESEARCH_SECTION: &str = "🔍 قسم البحث المتقدم";
pub const THINKING_SECTION: &str = "🧠 قسم التفكير العميق";
pub const AI_SECTION: &str = "🤖 قسم الذكاء الاصطناعي";
pub const BACK: &str = "🔙 القائمة الرئيسية";

pub const RESEARCH_GENERAL: &str = "🔍 بحث عام";
pub const RESEARCH_OPENAI: &str = "🤖 بحث مع OpenAI";
pub const RESEARCH_GEMINI: &str = "🌟 بحث مع Gemini";
pub const RESEARCH_HACKERGPT: &str = "👨‍💻 بحث مع HackerGPT";

pub const WELCOME: &str = "<b>🚀 Ultimate AI Mastermind - البوت الأقوى على الإطلاق</b>

<i>اختر أحد الأقسام المتخصصة:</i>

<b>📚 قسم التأليف والكتابة</b>
- أطروحات دكتوراه
- رسائل ماجستير
- تأليف كتب متخصصة

<b>🔐 قسم الأمن السيبراني</b>
- اختبارات اختراق
- تحليل الثغرات
- حماية الخصوصية

<b>🔍 قسم البحث المتقدم</b>
- بحث أكاديمي
- غوص في الويب العميق
- تحليل بيانات ضخمة

<b>🧠 قسم التفكير العميق</b>
- حل مشكلات معقدة
- تحليل فلسفي
- نمذجة مستقبلية

<b>🤖 قسم الذكاء الاصطناعي</b>
- توليد أكواد متقدمة
- تصميم خوارزميات
- تحليل أنظمة تعلم آلي";

pub const BACK_TO_MAIN: &str = "العودة إلى القائمة الرئيسية";
pub const WRITING_MENU_PROMPT: &str = "📚 <b>قسم التأليف والكتابة الأكاديمية</b>\n\nاختر نوع المحتوى المطلوب:";
pub const RESEARCH_MENU_PROMPT: &str = "🔍 <b>قسم البحث المتقدم</b>\n\nاختر محرك البحث:";
pub const SECURITY_PROMPT: &str = "🔐 <b>قسم الأمن السيبراني والاختراق الأخلاقي</b>\n\nأدخل الهدف للفحص (عنوان IP أو URL):";
pub const THINKING_PROMPT: &str = "🧠 <b>قسم التفكير العميق</b>\n\nاكتب سؤالك أو المشكلة التي تريد تحليلها:";
pub const AI_PROMPT: &str = "🤖 <b>قسم الذكاء الاصطناعي</b>\n\nاكتب طلبك البرمجي أو التقني:";

/// Academic writing types offered in the writing menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingKind {
    PhdThesis,
    MastersThesis,
    ReligiousBook,
    HistoryBook,
}

impl WritingKind {
    pub const ALL: [WritingKind; 4] = [
        WritingKind::PhdThesis,
        WritingKind::MastersThesis,
        WritingKind::ReligiousBook,
        WritingKind::HistoryBook,
    ];

    pub fn button(&self) -> &'static str {
        match self {
            WritingKind::PhdThesis => "📝 رسالة دكتوراه",
            WritingKind::MastersThesis => "🎓 رسالة ماجستير",
            WritingKind::ReligiousBook => "📖 تأليف كتاب ديني",
            WritingKind::HistoryBook => "🏛️ تأليف كتاب تاريخي",
        }
    }

    /// Name used in prompts, captions and session tags.
    pub fn label(&self) -> &'static str {
        match self {
            WritingKind::PhdThesis => "أطروحة دكتوراه",
            WritingKind::MastersThesis => "رسالة ماجستير",
            WritingKind::ReligiousBook => "كتاب ديني",
            WritingKind::HistoryBook => "كتاب تاريخي",
        }
    }

    /// ASCII file name stem for the generated document.
    pub fn file_stem(&self) -> &'static str {
        match self {
            WritingKind::PhdThesis => "phd_thesis",
            WritingKind::MastersThesis => "masters_thesis",
            WritingKind::ReligiousBook => "religious_book",
            WritingKind::HistoryBook => "history_book",
        }
    }

    pub fn from_button(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.button() == text)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }
}

/// Research menu buttons and the provider each one pins (`None` rotates).
pub fn research_choice(text: &str) -> Option<Option<&'static str>> {
    match text {
        RESEARCH_GENERAL => Some(None),
        RESEARCH_OPENAI => Some(Some("openai")),
        RESEARCH_GEMINI => Some(Some("gemini")),
        RESEARCH_HACKERGPT => Some(Some("hackergpt")),
        _ => None,
    }
}

pub fn main_menu() -> Keyboard {
    Keyboard::menu([WRITING_SECTION, SECURITY_SECTION, RESEARCH_SECTION, THINKING_SECTION, AI_SECTION])
}

pub fn writing_menu() -> Keyboard {
    let mut buttons: Vec<&'static str> = WritingKind::ALL.iter().map(|k| k.button()).collect();
    buttons.push(BACK);
    Keyboard::menu(buttons)
}

pub fn research_menu() -> Keyboard {
    Keyboard::menu([RESEARCH_GENERAL, RESEARCH_OPENAI, RESEARCH_GEMINI, RESEARCH_HACKERGPT, BACK])
}
