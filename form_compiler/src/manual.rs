/*!

This is the long-form manual for `form_compiler` and `formgen`.

## Writing a survey

A survey is a plain document, one question or option per line. Blank lines are ignored.
A line introduces a question when it carries an annotation between square brackets:

```text
[note] Good morning, we are conducting a survey about tea.
1. Do you like tea? [single]
Yes
No
2. Which teas have you tried? [multiple] [random]
a) Green
b) Black
c) Other, specify: ______
D1. How old are you? [numeric]
```

The lines that follow a question, up to the next question, are its options. The options may be
prefixed with a letter or a number (`a)`, `1.`, `(b)`), which is removed from the label.

An option that contains an underscore (`Other: ____`) asks for an open answer: a text field is
added after the question, and shown only when that option is picked.

## Question numbers

The number in front of a question controls the name of the field:

- `D3` (demographic questions) keeps its name: `D3`
- `Q12` is renamed `P12`
- anything else (`7.`, no number at all) is numbered `P1`, `P2`, ... in order of appearance

The label of the field is the number followed by the text of the question, for example
`D1. How old are you?`.

## Annotations

The annotations are not case sensitive. When a line carries several question types, the last one
is used.

### `[single]` and `[multiple]`

A question with one (resp. several) possible answers among the options that follow.

### `[numeric]`

A whole number.

### `[text]` or `[string]`

A free text answer.

### `[scale 1(low)-5(high)]`

A likert scale between the two bounds. The labels of the bounds are optional: `[scale 0-10]`.
The scales with the same bounds share the same list of choices.

### `[matrix single 3]` and `[matrix multiple 3]`

A grid question. The number is the count of columns: the next 3 lines are the column headers.
The lines after them, up to the next question, are the rows of the grid.

```text
Q5 How do you rate our shop? [matrix single 3]
Bad
Fair
Good
Service
Prices
```

### `[ranking 3]`

The respondent ranks 3 items among the options that follow. An item can only be picked once.

### `[note]`

A text displayed to the respondent, without any answer. A line starting with `[note]` is always
a note.

### `[other]`

The question is left out of the form. It is listed at the end of the compilation, to be added
manually.

### `[random]`

The options of the question are shown in random order.

### `[hint: text]`

An additional text shown under the question.

## Fixed questions

Every form starts with the start and end time stamps and the choice of the enumerator. In face to
face surveys, a GPS position is also collected. Every form ends with the name and the phone
number of the respondent.

## Errors

The compilation stops when:
- the list of enumerators cannot be loaded
- a grid declares more columns than there are lines left in the document
- a question has no options
- a ranking asks for more positions than it has items, or a scale has more than 101 points
- in strict mode, a line carries annotations that are not understood

*/
