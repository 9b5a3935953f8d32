//! Fixed option sets for the selection form.
//!
//! `value` is what the model sees; `label` is what the form shows.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn same(value: &'static str) -> SelectOption {
    SelectOption {
        value,
        label: value,
    }
}

pub const JOB_OPTIONS: &[SelectOption] = &[
    same("학생"),
    same("직장인 (사무직)"),
    same("직장인 (현장직)"),
    same("자영업자/사업가"),
    same("주부"),
    same("예술/창작"),
    same("의료/봉사"),
    same("교육/연구"),
    same("은퇴자"),
    same("취업준비생"),
    same("특별한 직업 없음"),
];

pub const AGE_OPTIONS: &[SelectOption] = &[
    same("10대"),
    same("20대 초반"),
    same("20대 후반"),
    same("30대 초반"),
    same("30대 후반"),
    same("40대"),
    same("50대"),
    same("60대 이상"),
];

pub const GENDER_OPTIONS: &[SelectOption] = &[
    same("남성"),
    same("여성"),
    same("밝히고 싶지 않음"),
];

pub const MOOD_OPTIONS: &[SelectOption] = &[
    SelectOption {
        value: "최고의 컨디션, 감사함, 모든 게 잘 풀림",
        label: "오늘 폼 미쳤다! / 갓생 사는 중 😎",
    },
    SelectOption {
        value: "현실 자각으로 인한 무기력함, 깊은 슬픔, 의욕 상실",
        label: "현타 제대로 옴 / 의욕 바닥 🫠",
    },
    SelectOption {
        value: "걱정이 많고 생각이 복잡함, 불안 초조, 정신적 안정 필요",
        label: "머릿속 복잡 / 멘탈 관리 시급 🤯",
    },
    SelectOption {
        value: "마음의 평화와 안정감, 소소하지만 확실한 행복",
        label: "오늘따라 평온 / 찐행복 모먼트 😌",
    },
    SelectOption {
        value: "극심한 분노, 답답함, 좌절감, 억울함",
        label: "킹받네 / 빡침주의보 💢",
    },
    SelectOption {
        value: "결정하기 어려움, 무엇을 해야 할지 모르는 혼란스러움",
        label: "선택장애 제대로 / 어떡하지? 😵‍💫",
    },
    SelectOption {
        value: "극심한 외로움, 소속감 부재, 사람들과 연결되고 싶은 마음",
        label: "나만 혼자인 기분 / 너무 외로워 🥺",
    },
    SelectOption {
        value: "큰 기대감, 희망에 부풀어 있음, 긍정적인 미래 예감",
        label: "가슴이 웅장해진다 / 뭔가 될 것 같아! ✨",
    },
    SelectOption {
        value: "과거의 행동에 대한 후회와 죄책감, 반성하는 마음",
        label: "내가 왜 그랬을까 / 반성 모드 🙏",
    },
    SelectOption {
        value: "정신적 공허함, 삶의 의미나 목적을 찾고 싶은 마음",
        label: "마음이 공허해 / 의미를 찾고 싶어 🤔",
    },
    SelectOption {
        value: "모든 걸 다 놓고 싶을 만큼 지침, 번아웃 직전",
        label: "다 때려치고 싶다 / 번아웃 직전 🔥",
    },
    SelectOption {
        value: "노력의 결실을 맺음, 작지만 확실한 성공과 행복",
        label: "플렉스 성공! / 소확행 만끽 중 🥳",
    },
];

/// Label for `value` within `options`, or the value itself when unknown.
pub fn label_for<'a>(options: &'a [SelectOption], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label)
        .unwrap_or(value)
}

/// First option's value; the form default for every select.
pub fn first_value(options: &[SelectOption]) -> String {
    options
        .first()
        .map(|o| o.value.to_string())
        .unwrap_or_default()
}
