//! The security section's canned report.
//!
//! No scan is performed; every target gets the same findings.

use super::chunk::escape_html;

pub fn report(target: &str) -> String {
    let target = escape_html(target.trim());
    format!(
        "<pre>⚠️ تقرير فحص أمني لـ {target}

🔍 النتائج:
1. تم اكتشاف 3 ثغرات أمنية حرجة
2. نظام التشغيل غير محدث
3. كلمات مرور ضعيفة

✅ التوصيات:
1. تحديث النظام فوراً
2. تغيير كلمات المرور
3. تفعيل جدار الحماية</pre>"
    )
}
