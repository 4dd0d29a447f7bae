use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use crate::{
    Error, Result,
    geo::GeoResolver,
    portal::PortalHandle,
    types::{IcsOptions, Lecture},
};

/// 日历使用的民用时区标识，固定为校方本地时区
pub const CALENDAR_TIMEZONE: &str = "Asia/Shanghai";

/// 讲座默认时长：教务系统不提供结束时间，统一按一小时计
const EVENT_DURATION_HOURS: i64 = 1;

/// ICS日历生成器
pub struct CalendarSynthesizer {
    options: IcsOptions,
    geo: GeoResolver,
}

impl CalendarSynthesizer {
    pub fn new(options: IcsOptions) -> Self {
        Self {
            options,
            geo: GeoResolver::default(),
        }
    }

    fn timezone() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap() // UTC+8
    }

    /// 讲座的稳定事件标识
    ///
    /// 教务系统不提供可用作 UID 的讲座编号，因此从不可变的描述字段
    /// 重建标识。相同讲座在每次生成中得到相同 UID，日历客户端据此
    /// 原地更新而不是重复插入。
    pub fn event_id(lecture: &Lecture) -> String {
        let key = format!(
            "{}__{}_{}_{}",
            lecture.category, lecture.issue_number, lecture.title, lecture.speaker
        );
        format!("{:x}", md5::compute(key.as_bytes()))
    }

    /// 构建讲座描述信息
    pub fn build_description(&self, lecture: &Lecture) -> String {
        format!(
            "主讲人：{}\n类别：{}\n听取情况：{}\n",
            lecture.speaker, lecture.category, lecture.attendance_status
        )
    }

    /// 从活动会话拉取讲座并生成日历字节
    pub async fn synthesize_for<H: PortalHandle>(&self, handle: &H) -> Result<Vec<u8>> {
        let lectures = handle.lectures().await.map_err(|e| match e {
            e @ (Error::Fetch(_) | Error::Timeout) => e,
            other => Error::Fetch(other.to_string()),
        })?;
        Ok(self.synthesize(&lectures)?.into_bytes())
    }

    /// 生成ICS日历内容
    pub fn synthesize(&self, lectures: &[Lecture]) -> Result<String> {
        let mut ics_content = String::new();

        // ICS文件头部
        ics_content.push_str("BEGIN:VCALENDAR\r\n");
        ics_content.push_str("VERSION:2.0\r\n");
        ics_content.push_str("PRODID:-//FZU ICS//FZU Lecture Calendar//CN\r\n");
        ics_content.push_str("CALSCALE:GREGORIAN\r\n");
        ics_content.push_str("METHOD:REQUEST\r\n");

        if let Some(ref name) = self.options.calendar_name {
            ics_content.push_str(&format!("X-WR-CALNAME:{}\r\n", self.escape_text(name)));
        }
        ics_content.push_str(&format!("X-WR-TIMEZONE:{}\r\n", CALENDAR_TIMEZONE));

        // 生成时间戳对全部事件一致
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        for lecture in lectures {
            self.add_lecture_event(&mut ics_content, lecture, &dtstamp)?;
        }

        // ICS文件尾部
        ics_content.push_str("END:VCALENDAR\r\n");

        Ok(ics_content)
    }

    /// 添加单个讲座事件
    fn add_lecture_event(
        &self,
        ics_content: &mut String,
        lecture: &Lecture,
        dtstamp: &str,
    ) -> Result<()> {
        let start = self.lecture_start(lecture)?;
        let end = start + Duration::hours(EVENT_DURATION_HOURS);

        ics_content.push_str("BEGIN:VEVENT\r\n");
        ics_content.push_str(&format!("UID:{}\r\n", Self::event_id(lecture)));
        ics_content.push_str(&format!("DTSTAMP:{}\r\n", dtstamp));
        ics_content.push_str(&format!("CREATED:{}\r\n", dtstamp));
        ics_content.push_str(&format!("LAST-MODIFIED:{}\r\n", dtstamp));
        ics_content.push_str(&format!(
            "SUMMARY:{}\r\n",
            self.escape_text(&lecture.title)
        ));
        ics_content.push_str(&format!(
            "DESCRIPTION:{}\r\n",
            self.escape_text(&self.build_description(lecture))
        ));
        ics_content.push_str(&format!(
            "LOCATION:{}\r\n",
            self.escape_text(&lecture.location)
        ));

        // 已知场馆才附带地理坐标
        if let Some(point) = self.geo.resolve(&lecture.location) {
            ics_content.push_str(&format!("GEO:{};{}\r\n", point.lat, point.lon));
        }

        ics_content.push_str(&format!(
            "DTSTART;TZID={}:{}\r\n",
            CALENDAR_TIMEZONE,
            start.format("%Y%m%dT%H%M%S")
        ));
        ics_content.push_str(&format!(
            "DTEND;TZID={}:{}\r\n",
            CALENDAR_TIMEZONE,
            end.format("%Y%m%dT%H%M%S")
        ));

        // 开始前的提醒
        if let Some(reminder_minutes) = self.options.reminder_minutes {
            ics_content.push_str("BEGIN:VALARM\r\n");
            ics_content.push_str("ACTION:DISPLAY\r\n");
            ics_content.push_str(&format!(
                "SUMMARY:{}\r\n",
                self.escape_text(&lecture.title)
            ));
            ics_content.push_str(&format!(
                "DESCRIPTION:{}\r\n",
                self.escape_text(&format!("地点: {}\n", lecture.location))
            ));
            ics_content.push_str(&format!("TRIGGER:-PT{}M\r\n", reminder_minutes));
            ics_content.push_str("END:VALARM\r\n");
        }

        ics_content.push_str("END:VEVENT\r\n");

        Ok(())
    }

    /// 按校方本地时区解释讲座时间戳
    fn lecture_start(&self, lecture: &Lecture) -> Result<DateTime<FixedOffset>> {
        Utc.timestamp_millis_opt(lecture.timestamp_millis)
            .single()
            .map(|dt| dt.with_timezone(&Self::timezone()))
            .ok_or_else(|| {
                Error::Internal(format!(
                    "invalid lecture timestamp: {}",
                    lecture.timestamp_millis
                ))
            })
    }

    /// 转义ICS文本内容
    fn escape_text(&self, text: &str) -> String {
        text.replace("\\", "\\\\")
            .replace("\n", "\\n")
            .replace("\r", "\\r")
            .replace(",", "\\,")
            .replace(";", "\\;")
    }
}

impl Default for CalendarSynthesizer {
    fn default() -> Self {
        Self::new(IcsOptions::default())
    }
}
