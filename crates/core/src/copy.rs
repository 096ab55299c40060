//! Campaign copy: the encouragement message tables and the rules that pick
//! from them. All campaign-phase state derives from an immutable
//! [`CampaignConfig`] constructed once at startup; nothing here is global.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use rand::Rng;

/// Which stretch of the camp we are in, derived from the week number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CampPhase {
    Early,
    Mid,
    Late,
}

impl CampPhase {
    pub fn for_week(week: u32) -> Self {
        match week {
            0..=2 => Self::Early,
            3..=5 => Self::Mid,
            _ => Self::Late,
        }
    }

    fn messages(self) -> &'static [&'static str] {
        match self {
            Self::Early => &[
                "새로운 시작! 여러분의 첫걸음을 응원해요 🚀",
                "처음은 언제나 설레죠! 잘 하고 있어요 😊",
            ],
            Self::Mid => &[
                "지금이 가장 중요한 시기! 함께 버텨봐요 💪",
                "고비는 곧 기회! 조금만 더 힘내요 🔥",
            ],
            Self::Late => &[
                "마무리가 가까워졌어요! 끝까지 응원할게요 🏁",
                "지금까지 잘 해온 것처럼, 마지막까지도 잘 할 거예요 ✨",
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            0..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    fn messages(self) -> &'static [&'static str] {
        match self {
            Self::Morning => &[
                "좋은 아침이에요! 오늘도 힘내요 ☀️",
                "기분 좋은 하루의 시작, 함께 열어요 🌼",
            ],
            Self::Afternoon => &[
                "점심 먹고 나른할 때, 잠깐 스트레칭 어떠세요? 🤸",
                "오늘 하루도 반 넘었어요! 남은 시간도 화이팅 💫",
            ],
            Self::Evening => &[
                "오늘 하루도 수고 많았어요 🌙",
                "하루 마무리 잘하고 푹 쉬세요 😴",
            ],
        }
    }
}

fn weekday_messages(weekday: Weekday) -> &'static [&'static str] {
    match weekday {
        Weekday::Sun => &["일요일은 충전하는 날! 푹 쉬어주세요 🔋"],
        Weekday::Mon => &["월요일! 새로운 한 주도 파이팅입니다 🔥"],
        Weekday::Tue => &["화요일엔 리듬을 타보세요! 🎵"],
        Weekday::Wed => &["수요일, 벌써 절반 왔어요 🐫"],
        Weekday::Thu => &["목요일은 주말이 보이기 시작하는 날 👀"],
        Weekday::Fri => &["금요일이에요! 한 주 고생 많았어요 🎉"],
        Weekday::Sat => &["주말 잘 보내고 있나요? 토닥토닥 🤗"],
    }
}

/// Campaign parameters fixed at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CampaignConfig {
    pub start_date: NaiveDate,
}

impl CampaignConfig {
    pub fn new(start_date: NaiveDate) -> Self {
        Self { start_date }
    }

    /// 1-based week number since the camp started, floored at 1 so a
    /// pre-start clock never produces week zero.
    pub fn camp_week(&self, now: DateTime<Utc>) -> u32 {
        let days = (now.date_naive() - self.start_date).num_days();
        if days < 0 {
            return 1;
        }
        (days / 7) as u32 + 1
    }

    pub fn phase(&self, now: DateTime<Utc>) -> CampPhase {
        CampPhase::for_week(self.camp_week(now))
    }

    /// Draws one message uniformly from the union of the time-of-day,
    /// phase, and weekday tables applicable at `now`.
    pub fn pick_message<R: Rng>(&self, now: DateTime<Utc>, rng: &mut R) -> &'static str {
        let mut candidates: Vec<&'static str> = Vec::new();
        candidates.extend_from_slice(TimeOfDay::for_hour(now.hour()).messages());
        candidates.extend_from_slice(self.phase(now).messages());
        candidates.extend_from_slice(weekday_messages(now.weekday()));

        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Text of the `/토닥` slash-command response for the current week.
    pub fn encouragement(&self, now: DateTime<Utc>) -> String {
        let week = self.camp_week(now);
        match CampPhase::for_week(week) {
            CampPhase::Early => format!(
                "지금은 캠프 {week}주차! 아직은 적응 중이에요 💫\n잘하고 있어요, 처음이 제일 어렵죠!"
            ),
            CampPhase::Mid => format!(
                "벌써 {week}주차! 중반을 넘고 있어요 💪\n지금이 가장 중요한 시기, 조금만 더 힘내요!"
            ),
            CampPhase::Late => format!(
                "캠프 {week}주차🎉 마지막 스퍼트 구간이에요!\n여기까지 온 당신이 자랑스러워요 👏"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rand::rngs::mock::StepRng;

    use super::{CampPhase, CampaignConfig, TimeOfDay};

    fn campaign() -> CampaignConfig {
        CampaignConfig::new(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
    }

    #[test]
    fn camp_week_is_one_based_and_floored() {
        let campaign = campaign();

        let before_start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(campaign.camp_week(before_start), 1);

        let day_one = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(campaign.camp_week(day_one), 1);

        let second_week = Utc.with_ymd_and_hms(2025, 7, 8, 0, 0, 0).unwrap();
        assert_eq!(campaign.camp_week(second_week), 2);
    }

    #[test]
    fn phase_bands_match_week_boundaries() {
        assert_eq!(CampPhase::for_week(1), CampPhase::Early);
        assert_eq!(CampPhase::for_week(2), CampPhase::Early);
        assert_eq!(CampPhase::for_week(3), CampPhase::Mid);
        assert_eq!(CampPhase::for_week(5), CampPhase::Mid);
        assert_eq!(CampPhase::for_week(6), CampPhase::Late);
    }

    #[test]
    fn time_of_day_buckets_split_at_noon_and_six() {
        assert_eq!(TimeOfDay::for_hour(0), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::for_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::for_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::for_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::for_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::for_hour(23), TimeOfDay::Evening);
    }

    #[test]
    fn pick_message_draws_from_the_applicable_tables() {
        let campaign = campaign();
        let now = Utc.with_ymd_and_hms(2025, 7, 2, 9, 0, 0).unwrap(); // Wednesday morning, week 1
        let mut rng = StepRng::new(0, 1);

        let message = campaign.pick_message(now, &mut rng);
        let pool: Vec<&str> = TimeOfDay::Morning
            .messages()
            .iter()
            .chain(CampPhase::Early.messages())
            .chain(super::weekday_messages(chrono::Weekday::Wed))
            .copied()
            .collect();

        assert!(pool.contains(&message));
    }

    #[test]
    fn encouragement_mentions_the_current_week() {
        let campaign = campaign();
        let mid_camp = Utc.with_ymd_and_hms(2025, 7, 22, 12, 0, 0).unwrap(); // week 4

        let text = campaign.encouragement(mid_camp);
        assert!(text.contains("4주차"));
        assert!(text.contains("중반"));
    }
}
