//! Terminal output for screens and records.

use anyhow::Result;
use client_core::{EmployeeForm, Screen};
use shared::domain::Employee;

pub fn screen(screen: &Screen, json: bool) -> Result<()> {
    match screen {
        Screen::Home => {
            println!("Employee desk");
            println!("  /list         all employees");
            println!("  /create       new employee");
            println!("  /edit/<id>    change an employee");
        }
        Screen::List(list) => {
            if let Some(notice) = list.notice() {
                eprintln!("{}", notice.message);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(list.employees())?);
            } else {
                employee_table(list.employees());
            }
        }
        Screen::Create(create) => form(create.form()),
        Screen::Edit(edit) => {
            if let Some(notice) = edit.notice() {
                eprintln!("{}", notice.message);
            }
            match edit.employee() {
                Some(employee) => employee_details(employee, json)?,
                None => println!("Employee {} is not loaded.", edit.id()),
            }
        }
        Screen::NotFound(path) => println!("Page not found: {path}"),
    }
    Ok(())
}

pub fn employee(employee: &Employee, json: bool) -> Result<()> {
    employee_details(employee, json)
}

fn employee_details(employee: &Employee, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(employee)?);
        return Ok(());
    }
    let id = employee
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("Id:          {id}");
    println!("Full name:   {}", employee.full_name);
    println!("Contact:     {}", employee.contact_preference);
    println!("Email:       {}", employee.email);
    println!("Phone:       {}", employee.phone.as_deref().unwrap_or("-"));
    println!("Skills:");
    for (index, skill) in employee.skills.iter().enumerate() {
        println!(
            "  [{index}] {} ({} yrs, {})",
            skill.skill_name, skill.experience_in_years, skill.proficiency
        );
    }
    Ok(())
}

fn employee_table(employees: &[Employee]) {
    if employees.is_empty() {
        println!("No employees.");
        return;
    }
    println!("{:>5}  {:<12}  {:<7}  {:<28}  SKILLS", "ID", "NAME", "CONTACT", "REACH");
    for employee in employees {
        let id = employee
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let skills = employee
            .skills
            .iter()
            .map(|skill| skill.skill_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:>5}  {:<12}  {:<7}  {:<28}  {}",
            id,
            employee.full_name,
            employee.contact_preference,
            employee.active_contact().unwrap_or("-"),
            skills
        );
    }
}

fn form(form: &EmployeeForm) {
    println!(
        "New employee form ({} skill entr{})",
        form.skill_count(),
        if form.skill_count() == 1 { "y" } else { "ies" }
    );
    for (field, message) in form.errors().iter() {
        println!("  {field}: {message}");
    }
}
