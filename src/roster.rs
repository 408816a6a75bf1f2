use crate::model::Student;

/// Groups offered by the group-selection screen.
pub const GROUPS: [u8; 6] = [1, 2, 3, 4, 5, 6];

const fn s(id: i64, name: &'static str, group: u8) -> Student {
    Student { id, name, group }
}

pub static STUDENTS: [Student; 26] = [
    s(12, "杰薰", 1),
    s(3, "李秉宸", 1),
    s(8, "何品諺", 1),
    s(17, "鄒宜彤", 1),
    s(26, "鄭舒云", 1),
    s(9, "陳庭宇", 2),
    s(1, "林田能", 2),
    s(24, "謝靚橙", 2),
    s(15, "林子晴", 2),
    s(18, "葉雯鏵", 2),
    s(2, "程競弘", 3),
    s(6, "曾恆昱", 3),
    s(22, "王若和", 3),
    s(25, "蕭禾婕", 3),
    s(16, "鄒采妤", 3),
    s(13, "許芮棠", 3),
    s(11, "游子靖", 4),
    s(4, "劉岱儒", 4),
    s(19, "林苡媗", 4),
    s(21, "莊芝棋", 4),
    s(14, "劉紜瑄", 4),
    s(7, "朱予行", 5),
    s(10, "池向毅", 5),
    s(5, "童宥森", 5),
    s(20, "吳予潔", 5),
    s(23, "黃品瑜", 5),
];

pub fn all() -> &'static [Student] {
    &STUDENTS
}

pub fn find(student_id: i64) -> Option<&'static Student> {
    STUDENTS.iter().find(|s| s.id == student_id)
}

pub fn is_group(group: u8) -> bool {
    GROUPS.contains(&group)
}

/// Members of `group` in roster order.
pub fn in_group(group: u8) -> impl Iterator<Item = &'static Student> {
    STUDENTS.iter().filter(move |s| s.group == group)
}
